// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Home page — pick or drop a crop photo.

use std::rc::Rc;

use dioxus::html::HasFileData;
use dioxus::prelude::*;

use cropdoc_core::CropdocError;
use cropdoc_core::error::ValidationError;
use cropdoc_core::types::UploadCandidate;

use crate::controller::ViewController;
use crate::ingest;
use crate::services::app_services::AppServices;

/// Hand a candidate to the controller and run the preparation off-thread.
fn submit(mut ctl: Signal<ViewController>, candidate: UploadCandidate) {
    let ticket = ctl.write().begin_upload(candidate);
    if let Some(ticket) = ticket {
        spawn(async move {
            let prepared = ticket.prepare().await;
            ctl.write().finish_upload(prepared);
        });
    }
}

#[component]
pub fn Home() -> Element {
    let mut ctl = use_context::<Signal<ViewController>>();
    let svc = use_context::<AppServices>();
    let mut hovering = use_signal(|| false);

    // Held for as long as this view is mounted.
    let zones = svc.drop_zones();
    let _registration = use_hook(move || Rc::new(zones.register()));

    let preparing = ctl.read().is_preparing();
    let border = if hovering() { "#16a34a" } else { "#a3a3a3" };

    rsx! {
        div {
            p { style: "color: #666;", "Take or choose a clear photo of one affected leaf." }

            div {
                style: "margin: 24px 0; padding: 48px 16px; border: 2px dashed {border}; border-radius: 16px; text-align: center; background: #fafafa;",
                ondragover: move |evt: DragEvent| {
                    evt.prevent_default();
                    hovering.set(true);
                },
                ondragleave: move |_| hovering.set(false),
                ondrop: move |evt: DragEvent| {
                    evt.prevent_default();
                    evt.stop_propagation();
                    hovering.set(false);

                    let files = evt.files();
                    let meta: Vec<(String, Option<String>)> =
                        files.iter().map(|f| (f.name(), f.content_type())).collect();
                    let index = ingest::first_dropped_image(
                        meta.iter().map(|(name, mime)| (name.as_str(), mime.as_deref())),
                    );
                    let Some(file) = index.and_then(|i| files.into_iter().nth(i)) else {
                        tracing::info!(count = meta.len(), "drop contained no image");
                        ctl.write().report(&ValidationError::NotAnImage.into());
                        return;
                    };

                    spawn(async move {
                        let name = file.name();
                        let content_type = file.content_type();
                        match file.read_bytes().await {
                            Ok(bytes) => {
                                submit(ctl, ingest::candidate_from_drop(name, content_type, bytes.to_vec()));
                            }
                            Err(e) => {
                                tracing::error!(name = %name, error = %e, "reading dropped file failed");
                                ctl.write().report(&CropdocError::ImageError(e.to_string()));
                            }
                        }
                    });
                },

                p { style: "font-size: 40px; margin: 0;", "\u{1F33F}" }
                p { style: "font-size: 16px; color: #333;", "Drop a photo here" }
                p { style: "font-size: 13px; color: #888;", "JPG, PNG, BMP, TIFF or WebP, up to 10MB" }

                button {
                    style: "margin-top: 12px; padding: 12px 24px; border-radius: 12px; border: none; background: #16a34a; color: white; font-size: 16px;",
                    disabled: preparing,
                    onclick: move |_| {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", ingest::picker_extensions())
                            .pick_file()
                        {
                            spawn(async move {
                                match ingest::candidate_from_path(&path).await {
                                    Ok(candidate) => submit(ctl, candidate),
                                    Err(e) => {
                                        tracing::error!(error = %e, "reading picked file failed");
                                        ctl.write().report(&e);
                                    }
                                }
                            });
                        }
                    },
                    if preparing { "Preparing..." } else { "Choose Photo" }
                }
            }

            button {
                style: "width: 100%; padding: 12px; border-radius: 8px; border: 1px solid #ccc; background: white;",
                onclick: move |_| ctl.write().show_about(),
                "How it works"
            }
        }
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// About page — how the scanner works, plus service diagnostics.

use dioxus::prelude::*;

use cropdoc_client::{disease_names, disease_summary};
use cropdoc_core::human_errors::humanize_error;

use crate::controller::ViewController;
use crate::services::app_services::AppServices;

#[component]
pub fn About() -> Element {
    let mut ctl = use_context::<Signal<ViewController>>();
    let svc = use_context::<AppServices>();
    let mut health = use_signal(|| svc.last_health());
    let mut checking = use_signal(|| false);
    let mut diseases = use_signal(|| Option::<Result<Vec<String>, String>>::None);
    let mut details = use_signal(|| Option::<(String, Result<String, String>)>::None);

    let api = svc.config().api_base_url.clone();

    rsx! {
        div {
            ol { style: "line-height: 1.6;",
                Step { title: "Take a photo", detail: "Photograph one affected leaf in good light, filling most of the frame." }
                Step { title: "Upload", detail: "Large photos are resized on your device before they are sent." }
                Step { title: "Analyze", detail: "A trained model identifies the disease and how sure it is." }
                Step { title: "Act", detail: "Follow the treatment and prevention steps, and save the results for later." }
            }

            section { style: "margin: 24px 0; padding: 12px; border: 1px solid #e0e0e0; border-radius: 8px;",
                h3 { style: "margin-top: 0;", "Diagnosis service" }
                p { style: "font-size: 13px; color: #888; word-break: break-all;", "{api}" }
                div { style: "display: flex; gap: 8px;",
                    button {
                        style: "flex: 1; padding: 8px; border-radius: 8px; border: 1px solid #ccc; background: white;",
                        disabled: checking(),
                        onclick: {
                            let svc = svc.clone();
                            move |_| {
                                let svc = svc.clone();
                                checking.set(true);
                                spawn(async move {
                                    health.set(Some(svc.probe_health().await));
                                    checking.set(false);
                                });
                            }
                        },
                        if checking() { "Checking..." } else { "Check connection" }
                    }
                    button {
                        style: "flex: 1; padding: 8px; border-radius: 8px; border: 1px solid #ccc; background: white;",
                        onclick: {
                            let svc = svc.clone();
                            move |_| {
                                let client = svc.client();
                                spawn(async move {
                                    let listed = client
                                        .supported_diseases()
                                        .await
                                        .map(|body| disease_names(&body))
                                        .map_err(|e| humanize_error(&e).message);
                                    diseases.set(Some(listed));
                                });
                            }
                        },
                        "Supported diseases"
                    }
                }
                if let Some(status) = health() {
                    p { style: "font-size: 14px; color: #333;", "{status}" }
                }
                match diseases() {
                    Some(Ok(names)) => rsx! {
                        ul { style: "font-size: 14px; columns: 2;",
                            for name in names {
                                li {
                                    key: "{name}",
                                    style: "cursor: pointer; color: #166534;",
                                    onclick: {
                                        let svc = svc.clone();
                                        let name = name.clone();
                                        move |_| {
                                            let client = svc.client();
                                            let name = name.clone();
                                            spawn(async move {
                                                let info = client
                                                    .disease_info(&name)
                                                    .await
                                                    .map(|body| disease_summary(&body))
                                                    .map_err(|e| humanize_error(&e).message);
                                                details.set(Some((name, info)));
                                            });
                                        }
                                    },
                                    "{name}"
                                }
                            }
                        }
                        match details() {
                            Some((name, Ok(summary))) => rsx! {
                                div { style: "font-size: 14px; padding: 8px; background: #f0fdf4; border-radius: 8px;",
                                    strong { "{name}" }
                                    p { style: "margin: 4px 0 0; white-space: pre-wrap;", "{summary}" }
                                }
                            },
                            Some((_, Err(message))) => rsx! {
                                p { style: "font-size: 14px; color: #dc2626;", "{message}" }
                            },
                            None => rsx! {},
                        }
                    },
                    Some(Err(message)) => rsx! {
                        p { style: "font-size: 14px; color: #dc2626;", "{message}" }
                    },
                    None => rsx! {},
                }
            }

            button {
                style: "width: 100%; padding: 12px; border-radius: 8px; border: 1px solid #ccc; background: white;",
                onclick: move |_| ctl.write().back(),
                "Back"
            }
        }
    }
}

#[component]
fn Step(title: &'static str, detail: &'static str) -> Element {
    rsx! {
        li { style: "margin-bottom: 8px;",
            strong { "{title}" }
            br {}
            span { style: "color: #666; font-size: 14px;", "{detail}" }
        }
    }
}

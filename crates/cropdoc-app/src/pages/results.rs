// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Results page — diagnosis, treatment and prevention steps, export.

use dioxus::prelude::*;

use crate::controller::ViewController;
use crate::services::app_services::AppServices;

#[component]
pub fn Results() -> Element {
    let mut ctl = use_context::<Signal<ViewController>>();
    let svc = use_context::<AppServices>();
    let mut saved_to = use_signal(|| Option::<String>::None);
    let mut saving = use_signal(|| false);

    let Some(result) = ctl.read().result().cloned() else {
        return rsx! {
            p { style: "color: #888;", "No results yet." }
        };
    };
    let (fg, bg) = result.severity_tone().colors();

    rsx! {
        div {
            // Headline
            div { style: "padding: 16px; border-radius: 12px; background: {bg};",
                if result.is_healthy() {
                    p { style: "margin: 0; color: #16a34a; font-weight: 600;", "Your crop looks healthy" }
                }
                h2 { style: "margin: 4px 0; color: {fg};", "{result.disease}" }
                div { style: "display: flex; gap: 12px; font-size: 14px; color: #333;",
                    span { "Confidence: {result.confidence}" }
                    if !result.severity.is_empty() {
                        span { "Severity: {result.severity}" }
                    }
                }
                if let Some(ref area) = result.affected_area {
                    p { style: "margin: 4px 0 0; font-size: 14px; color: #555;", "Affected: {area}" }
                }
            }

            if !result.description.is_empty() {
                p { style: "margin: 16px 0; color: #333;", "{result.description}" }
            }

            if !result.treatment.is_empty() {
                h3 { "Treatment" }
                ol {
                    for step in result.treatment.iter() {
                        li { style: "margin: 4px 0;", "{step}" }
                    }
                }
            }

            if !result.prevention.is_empty() {
                h3 { "Prevention" }
                ol {
                    for step in result.prevention.iter() {
                        li { style: "margin: 4px 0;", "{step}" }
                    }
                }
            }

            // Actions
            div { style: "display: flex; gap: 8px; margin-top: 24px;",
                button {
                    style: "flex: 1; padding: 12px; border-radius: 8px; border: 1px solid #ccc; background: white;",
                    disabled: saving(),
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            let snapshot = {
                                let c = ctl.read();
                                c.result().cloned().zip(c.image().cloned())
                            };
                            let Some((result, image)) = snapshot else { return };
                            let svc = svc.clone();
                            saving.set(true);
                            spawn(async move {
                                match svc.export_result(&result, &image).await {
                                    Ok(path) => saved_to.set(Some(path.display().to_string())),
                                    Err(e) => {
                                        tracing::error!(error = %e, "export failed");
                                        ctl.write().report(&e);
                                    }
                                }
                                saving.set(false);
                            });
                        }
                    },
                    "Save Results"
                }
                button {
                    style: "flex: 1; padding: 12px; border-radius: 8px; border: none; background: #16a34a; color: white;",
                    onclick: move |_| ctl.write().scan_another(),
                    "Scan Another"
                }
            }

            if let Some(path) = saved_to() {
                p { style: "margin-top: 8px; color: #666; font-size: 13px; word-break: break-all;",
                    "Saved to {path}"
                }
            }

            button {
                style: "width: 100%; margin-top: 8px; padding: 12px; border-radius: 8px; border: 1px solid #ccc; background: white;",
                onclick: move |_| ctl.write().back(),
                "Back"
            }
        }
    }
}

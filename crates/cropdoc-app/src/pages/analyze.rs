// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Analyze page — preview the prepared photo and send it for diagnosis.

use dioxus::prelude::*;

use crate::controller::ViewController;
use crate::services::app_services::AppServices;

#[component]
pub fn Analyze() -> Element {
    let mut ctl = use_context::<Signal<ViewController>>();
    let svc = use_context::<AppServices>();

    let (preview, summary, analyzing) = {
        let c = ctl.read();
        let summary = c.image().map(|img| {
            let kb = img.size() / 1024;
            if img.transcoded {
                format!("{} · {kb} KB (resized)", img.name)
            } else {
                format!("{} · {kb} KB", img.name)
            }
        });
        (c.preview(), summary, c.is_analyzing())
    };

    rsx! {
        div {
            if let Some(preview) = preview {
                img {
                    src: "{preview}",
                    alt: "Selected crop photo",
                    style: "width: 100%; max-height: 360px; object-fit: contain; border-radius: 12px; background: #f0f0f0;",
                }
            }
            if let Some(summary) = summary {
                p { style: "color: #888; font-size: 13px; text-align: center;", "{summary}" }
            }

            button {
                style: "width: 100%; margin-top: 16px; padding: 14px; border-radius: 12px; border: none; background: #16a34a; color: white; font-size: 16px;",
                disabled: analyzing,
                onclick: {
                    let svc = svc.clone();
                    move |_| {
                        let ticket = ctl.write().begin_analysis();
                        let Some(ticket) = ticket else { return };
                        let client = svc.client();
                        spawn(async move {
                            let outcome = client.predict(ticket.image()).await;
                            ctl.write().finish_analysis(ticket.id(), outcome);
                        });
                    }
                },
                if analyzing { "Analyzing..." } else { "Start Analysis" }
            }

            if analyzing {
                p { style: "text-align: center; color: #666; font-size: 14px;",
                    "This can take up to 30 seconds while the service wakes up."
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

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cropdoc — crop-disease scanner
//
// Entry point. Initialises logging and backend services, then launches the
// Dioxus UI.

mod controller;
mod drop_zone;
mod export;
mod ingest;
mod pages;
mod services;

use dioxus::prelude::*;

use cropdoc_core::human_errors::humanize_error;
use cropdoc_core::types::ScreenState;

use controller::ViewController;
use pages::about::About;
use pages::analyze::Analyze;
use pages::home::Home;
use pages::results::Results;
use services::app_services::AppServices;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Cropdoc starting");

    dioxus::launch(app);
}

/// Root component.
fn app() -> Element {
    let services = use_hook(|| match AppServices::init() {
        Ok(s) => Ok(s),
        Err(e) => {
            tracing::error!(error = %e, "service initialisation failed");
            Err(humanize_error(&e).message)
        }
    });

    match services {
        Ok(services) => rsx! { Shell { services } },
        Err(message) => rsx! {
            div { style: "padding: 24px; font-family: system-ui, -apple-system, sans-serif;",
                h1 { "Cropdoc could not start" }
                p { style: "color: #dc2626;", "{message}" }
            }
        },
    }
}

/// Provides services and the controller, then renders the current screen.
#[component]
fn Shell(services: AppServices) -> Element {
    use_context_provider(|| services.clone());
    let ctl = use_context_provider(|| {
        Signal::new(ViewController::new(services.config(), services.previews()))
    });

    let zones = services.drop_zones();
    let zones_over = zones.clone();
    let screen = ctl.read().screen();

    rsx! {
        div { class: "app-container",
            style: "display: flex; flex-direction: column; height: 100vh; font-family: system-ui, -apple-system, sans-serif;",
            // Drops that miss the drop zone must not navigate the webview.
            ondragover: move |evt: DragEvent| {
                if zones_over.suppress_stray_drops() {
                    evt.prevent_default();
                }
            },
            ondrop: move |evt: DragEvent| {
                if zones.suppress_stray_drops() {
                    evt.prevent_default();
                    tracing::debug!("stray drop ignored");
                }
            },

            header {
                style: "padding: 12px 16px; border-bottom: 1px solid #e0e0e0; background: #f0fdf4;",
                h1 { style: "margin: 0; font-size: 20px; color: #166534;", "{screen.title()}" }
            }

            div { class: "page-content",
                style: "flex: 1; overflow-y: auto; padding: 16px;",
                ErrorBanner {}
                match screen {
                    ScreenState::Home => rsx! { Home {} },
                    ScreenState::Analyze => rsx! { Analyze {} },
                    ScreenState::Results => rsx! { Results {} },
                    ScreenState::About => rsx! { About {} },
                }
            }
        }
    }
}

/// The single error slot, with its suggested next step.
#[component]
fn ErrorBanner() -> Element {
    let mut ctl = use_context::<Signal<ViewController>>();
    let Some(err) = ctl.read().error_detail().cloned() else {
        return rsx! {};
    };

    rsx! {
        div { style: "margin-bottom: 16px; padding: 12px; border-radius: 8px; background: #fee2e2; color: #991b1b;",
            div { style: "display: flex; justify-content: space-between; align-items: start;",
                strong { "{err.message}" }
                button {
                    style: "border: none; background: none; color: #991b1b; font-size: 16px;",
                    onclick: move |_| ctl.write().dismiss_error(),
                    "\u{2715}"
                }
            }
            p { style: "margin: 4px 0 0; font-size: 14px;", "{err.suggestion}" }
        }
    }
}

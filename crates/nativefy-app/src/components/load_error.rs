// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Retry screen shown when the web content fails to load. Reload is the only
// way out; errors that retrying cannot fix hide the button.

use dioxus::prelude::*;
use nativefy_core::human_errors::HumanError;

#[component]
pub fn LoadError(error: HumanError, on_retry: EventHandler<()>) -> Element {
    rsx! {
        div {
            style: "position: absolute; inset: 0; display: flex; flex-direction: column; justify-content: center; align-items: center; padding: 24px; background: #FFFFFF; z-index: 10;",
            h2 { style: "font-size: 20px; font-weight: 600; color: #1A1A1A; margin-bottom: 8px; text-align: center;",
                "{error.message}"
            }
            p { style: "font-size: 16px; color: #666666; text-align: center; margin-bottom: 24px; line-height: 24px;",
                "{error.suggestion}"
            }
            if error.retriable {
                button {
                    style: "background: #000000; color: #FFFFFF; padding: 12px 24px; border: none; border-radius: 8px; font-size: 16px; font-weight: 600;",
                    onclick: move |_| on_retry.call(()),
                    "Try again"
                }
            }
        }
    }
}

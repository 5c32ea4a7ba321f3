// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Launch splash overlay, shown until the content first loads or fails.

use dioxus::prelude::*;

#[component]
pub fn Splash() -> Element {
    rsx! {
        div {
            style: "position: absolute; inset: 0; display: flex; align-items: center; justify-content: center; background: #FFFFFF; z-index: 20;",
            div { style: "width: 200px; text-align: center; font-size: 28px; font-weight: 600; color: #1A1A1A;",
                "nativefy"
            }
        }
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The webview hosting the web application, with the loading overlay, the
// retry screen, and the relay carrying bridge calls.
//
// The web application runs in its own wry webview laid over the shell
// window, so the bridge shim is installed as that webview's initialization
// script and runs in the application's origin.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use dioxus::desktop::tao::event::{Event, WindowEvent};
use dioxus::desktop::wry::{self, PageLoadEvent, Rect, WebView, WebViewBuilder};
use dioxus::desktop::{DesktopContext, use_window, use_wry_event_handler};
use dioxus::prelude::*;
use nativefy_bridge::{
    BrowserSurface, LoadPhase, NotificationIdentityManager, ObserverRegistration, WebViewHost,
};
use nativefy_core::error::{NativefyError, Result};
use nativefy_core::types::WebViewEvent;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::bridge::{ContentEvent, NATIVEFY_WEBVIEW};
use crate::components::load_error::LoadError;
use crate::services::app_services::AppServices;

/// The web application's webview, built as a child of the shell window on
/// first load.
struct ContentSurface {
    desktop: DesktopContext,
    events: mpsc::UnboundedSender<ContentEvent>,
    webview: RefCell<Option<WebView>>,
    uri: RefCell<String>,
}

impl ContentSurface {
    fn new(desktop: DesktopContext, events: mpsc::UnboundedSender<ContentEvent>) -> Self {
        Self {
            desktop,
            events,
            webview: RefCell::new(None),
            uri: RefCell::new(String::new()),
        }
    }

    fn build(&self, uri: &str) -> Result<WebView> {
        let calls = self.events.clone();
        let loads = self.events.clone();
        let size = self.desktop.window.inner_size();
        let init_script = NATIVEFY_WEBVIEW.init_script();

        WebViewBuilder::new()
            .with_url(uri)
            .with_initialization_script(&init_script)
            // Receives messages from window.ipc.postMessage()
            .with_ipc_handler(move |req: wry::http::Request<String>| {
                let origin = req.uri().to_string();
                if let Some(event) = ContentEvent::from_ipc(origin, req.into_body()) {
                    // A closed channel means the view has unmounted.
                    let _ = calls.send(event);
                }
            })
            .with_on_page_load_handler(move |event, url| {
                debug!(%url, started = matches!(event, PageLoadEvent::Started), "content page load");
                let event = match event {
                    PageLoadEvent::Started => WebViewEvent::LoadStart,
                    PageLoadEvent::Finished => WebViewEvent::LoadEnd,
                };
                let _ = loads.send(ContentEvent::Load(event));
            })
            .with_bounds(bounds(size.width, size.height))
            .with_visible(false)
            .build_as_child(&*self.desktop.window)
            .map_err(content_error)
    }

    /// Run `script` in the content's top-level document.
    fn evaluate(&self, script: &str) {
        match self.webview.borrow().as_ref() {
            Some(webview) => {
                if let Err(e) = webview.evaluate_script(script) {
                    warn!(error = %e, "could not deliver bridge response");
                }
            }
            None => warn!("bridge response arrived with no content webview"),
        }
    }

    fn show(&self, visible: bool) {
        if let Some(webview) = self.webview.borrow().as_ref() {
            if let Err(e) = webview.set_visible(visible) {
                warn!(error = %e, visible, "could not change content visibility");
            }
        }
    }

    fn fit(&self, width: u32, height: u32) {
        if let Some(webview) = self.webview.borrow().as_ref() {
            if let Err(e) = webview.set_bounds(bounds(width, height)) {
                warn!(error = %e, "could not resize content webview");
            }
        }
    }
}

impl BrowserSurface for ContentSurface {
    fn load(&self, uri: &str) -> Result<()> {
        self.uri.replace(uri.to_string());
        if let Some(webview) = self.webview.borrow().as_ref() {
            return webview.load_url(uri).map_err(content_error);
        }
        let webview = self.build(uri)?;
        self.webview.replace(Some(webview));
        Ok(())
    }

    fn reload(&self) -> Result<()> {
        if let Some(webview) = self.webview.borrow().as_ref() {
            return webview.reload().map_err(content_error);
        }
        // The webview was never created; try again from scratch.
        let uri = self.uri.borrow().clone();
        self.load(&uri)
    }
}

fn bounds(width: u32, height: u32) -> Rect {
    Rect {
        position: wry::dpi::PhysicalPosition::new(0, 0).into(),
        size: wry::dpi::PhysicalSize::new(width, height).into(),
    }
}

fn content_error(e: wry::Error) -> NativefyError {
    NativefyError::ContentLoad(e.to_string())
}

/// Keep notification observers registered for as long as the calling view
/// is mounted. A newer mount takes the observers over from an older one.
pub fn use_notification_observers(
    identity: &Arc<NotificationIdentityManager>,
) -> Rc<ObserverRegistration> {
    let identity = Arc::clone(identity);
    use_hook(move || Rc::new(identity.observe()))
}

#[component]
pub fn AppWebView(uri: String, on_ready: EventHandler<()>) -> Element {
    let svc = use_context::<AppServices>();

    // Every render points the bridge at the current implementation.
    NATIVEFY_WEBVIEW.slot().set(svc.bridge_impl());

    use_notification_observers(svc.identity());

    let identity = svc.identity().clone();
    use_future(move || {
        let identity = identity.clone();
        async move {
            if let Err(e) = identity.start().await {
                error!(error = %e, "push notification startup failed");
            }
        }
    });

    let desktop = use_window();
    let (surface, inbox) = use_hook(move || {
        let (tx, rx) = mpsc::unbounded_channel();
        let surface = Rc::new(ContentSurface::new(desktop, tx));
        (surface, Rc::new(RefCell::new(Some(rx))))
    });
    let mut host = use_signal(WebViewHost::new);
    let load_timeout = svc.config().load_timeout;

    use_hook({
        let surface = surface.clone();
        move || {
            if host.write().load(&*surface, &uri) {
                on_ready.call(());
            }
            arm_watchdog(host, load_timeout, on_ready);
        }
    });

    use_future({
        let surface = surface.clone();
        move || {
            let surface = surface.clone();
            let inbox = inbox.borrow_mut().take();
            async move {
                let Some(mut inbox) = inbox else {
                    return;
                };
                while let Some(event) = inbox.recv().await {
                    match event {
                        ContentEvent::Load(event) => {
                            if host.write().handle(&event) {
                                info!(?event, "web content ready");
                                on_ready.call(());
                            }
                        }
                        ContentEvent::Call { origin, payload } => {
                            let surface = surface.clone();
                            spawn(async move { relay_call(&surface, &origin, &payload).await });
                        }
                    }
                }
            }
        }
    });

    // The content webview sits above the shell document, so it is hidden
    // whenever the spinner or retry screen has to show through.
    use_effect({
        let surface = surface.clone();
        move || surface.show(host.read().shows_content())
    });

    use_wry_event_handler({
        let surface = surface.clone();
        move |event, _| {
            if let Event::WindowEvent {
                event: WindowEvent::Resized(size),
                ..
            } = event
            {
                surface.fit(size.width, size.height);
            }
        }
    });

    let reload = move |_| {
        if host.write().reload(&*surface) {
            on_ready.call(());
        }
        arm_watchdog(host, load_timeout, on_ready);
    };

    let phase = host.read().phase().clone();

    rsx! {
        div { style: "position: relative; width: 100%; height: 100%;",
            {match phase {
                LoadPhase::Loading => rsx! {
                    div {
                        style: "position: absolute; inset: 0; display: flex; justify-content: center; align-items: center; background: #FFFFFF;",
                        div { style: "width: 36px; height: 36px; border: 4px solid #E0E0E0; border-top-color: #000000; border-radius: 50%;" }
                    }
                },
                LoadPhase::Loaded => rsx! {},
                LoadPhase::Failed(human) => rsx! {
                    LoadError { error: human, on_retry: reload }
                },
            }}
        }
    }
}

/// Treat a load that has not settled after `timeout` as a failure, so the
/// retry screen replaces a spinner that would otherwise spin forever.
fn arm_watchdog(mut host: Signal<WebViewHost>, timeout: Duration, on_ready: EventHandler<()>) {
    let attempt = host.peek().reloads();
    spawn(async move {
        tokio::time::sleep(timeout).await;
        let stale = host.peek().reloads() != attempt;
        if stale || *host.peek().phase() != LoadPhase::Loading {
            return;
        }
        let err = NativefyError::ContentLoad(format!(
            "load timed out after {}s",
            timeout.as_secs()
        ));
        if host.write().fail(&err) {
            on_ready.call(());
        }
    });
}

/// Dispatch one bridge request and settle the page's promise with the answer.
///
/// Each call runs in its own task, so a slow call never holds up the others.
async fn relay_call(surface: &ContentSurface, origin: &str, payload: &str) {
    match NATIVEFY_WEBVIEW.handle_message(origin, payload).await {
        Ok(response) => {
            debug!(origin, "settling bridge call");
            surface.evaluate(&NATIVEFY_WEBVIEW.settle_script(&response));
        }
        Err(e) => error!(error = %e, "could not encode bridge response"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nativefy_bridge::stub::StubPushProvider;

    fn observed_view() -> Element {
        let identity = use_context::<Arc<NotificationIdentityManager>>();
        use_notification_observers(&identity);
        rsx! {}
    }

    fn mount(identity: &Arc<NotificationIdentityManager>) -> VirtualDom {
        let mut dom = VirtualDom::new(observed_view).with_root_context(Arc::clone(identity));
        dom.rebuild_in_place();
        dom
    }

    #[test]
    fn remounted_view_keeps_exactly_one_observer_pair() {
        let provider = Arc::new(StubPushProvider::new());
        let identity = Arc::new(NotificationIdentityManager::new(provider.clone(), "app-id"));

        let old_view = mount(&identity);
        assert_eq!(provider.observer_count(), 2);

        // The replacement mounts before the old view is torn down.
        let new_view = mount(&identity);
        assert_eq!(provider.observer_count(), 2);

        drop(old_view);
        assert_eq!(provider.observer_count(), 2);
        assert!(identity.session().is_observing());

        drop(new_view);
        assert_eq!(provider.observer_count(), 0);
    }
}

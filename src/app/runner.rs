//! Menu loop and request firing

use anyhow::Result;
use serde_json::Value;
use tokio::runtime::Handle;

use crate::constants::TICK_INTERVAL;
use crate::hooks::{menu_hook, response_hook, MenuHook};
use crate::menu::{shortcut_for, Menu};
use crate::models::{
    is_empty_value, ApiResponse, HttpRequest, Request, SocketIoRequest, Variables,
};
use crate::network::{create_client, execute_request, SocketClient};
use crate::storage::ProjectStore;
use crate::viewer::style::{status_style, STATUS_SERVER_ERROR};
use crate::viewer::{KeySource, SharedDisplay, Ticker};

const MENU_TITLE: &str = "Select a request:";
const EXECUTING_HEADER: &str = "Executing request…";

/// Interactive session over one project
pub struct App {
    store: ProjectStore,
    vars: Variables,
    display: SharedDisplay,
    runtime: Handle,
    client: reqwest::Client,
    menu: Menu,
    menu_hook: Box<dyn MenuHook>,
    last_response: Option<ApiResponse>,
}

impl App {
    pub fn new(store: ProjectStore, display: SharedDisplay, runtime: Handle) -> Self {
        let vars = store.project.variables.clone();
        let menu_hook = menu_hook(store.project.callback_menu.as_deref());
        App {
            store,
            vars,
            display,
            runtime,
            client: create_client(),
            menu: Menu::new(MENU_TITLE, Vec::new()),
            menu_hook,
            last_response: None,
        }
    }

    pub fn variables(&self) -> &Variables {
        &self.vars
    }

    /// Menu entries for every buildable request, with the project request
    /// index each one fires
    fn menu_entries(&self) -> (Vec<(String, char)>, Vec<usize>) {
        let project = &self.store.project;
        let mut items = Vec::new();
        let mut targets = Vec::new();
        for (idx, def) in project.requests.iter().enumerate() {
            if let Some(request) = def.build(&project.api_base, &self.vars) {
                items.push((request.desc().to_string(), shortcut_for(items.len())));
                targets.push(idx);
            }
        }
        items.push(("quit".to_string(), 'q'));
        (items, targets)
    }

    /// Show the menu and fire requests until the user quits
    pub fn run(&mut self, input: &mut dyn KeySource) -> Result<()> {
        loop {
            let (items, targets) = self.menu_entries();
            self.menu.items = items;
            if self.menu.selection >= self.menu.items.len() {
                self.menu.selection = 0;
            }
            self.menu_hook
                .invoke(&self.vars, &mut self.menu, self.last_response.as_ref());

            let Some(selected) = self.menu.wait_for_selection(&self.display, input)? else {
                break;
            };
            let Some(&target) = targets.get(selected) else {
                break;
            };

            let project = &self.store.project;
            match project.requests[target].build(&project.api_base, &self.vars) {
                Some(Request::Http(request)) => {
                    self.fire_http(request);
                    self.display.browse(input)?;
                }
                Some(Request::SocketIo(request)) => {
                    self.last_response = None;
                    let session = self.start_socket(request);
                    let browsed = self.display.browse(input);
                    if let Some(session) = session {
                        session.stop(&self.runtime);
                    }
                    browsed?;
                }
                None => continue,
            }
        }
        tracing::info!("Leaving request menu");
        Ok(())
    }

    /// Send the request while printing progress, then run its hook and persist
    /// the exchange
    fn fire_http(&mut self, mut request: HttpRequest) {
        {
            let mut display = self.display.lock();
            display.start();
            display.set_header(EXECUTING_HEADER);
            display.set_footer("");
            display.print(&format!("\nSending {}", request.summary()), false);
            if !request.headers.is_empty() {
                display.print("headers = ", false);
                display.print_value(&Value::Object(request.headers.clone()), true);
            }
            if !is_empty_value(&request.body) {
                display.print("body = ", false);
                display.print_value(&request.body, true);
            }
            display.print("", false);
        }

        request.timestamp = Some(chrono::Utc::now());
        let dots = self.display.clone();
        let ticker = Ticker::start(&self.runtime, TICK_INTERVAL, move || {
            dots.lock().print(".", true)
        });
        let response = self.runtime.block_on(execute_request(&self.client, &request));
        ticker.stop();

        {
            let mut display = self.display.lock();
            display.print("", false);
            match response.status_code {
                Some(code) => {
                    display.print_styled(
                        &format!("Received response {} in {:.3}s:", code, response.duration_secs),
                        status_style(Some(code)),
                        false,
                    );
                    match &response.body {
                        Some(body) if !is_empty_value(body) => display.print_value(body, false),
                        _ => display.print(&response.text, false),
                    }
                }
                None => display.print_styled(
                    &format!(
                        "Request failed after {:.3}s: {}",
                        response.duration_secs,
                        response.error.as_deref().unwrap_or_default()
                    ),
                    STATUS_SERVER_ERROR,
                    false,
                ),
            }

            let hook = response_hook(request.callback.as_deref());
            hook.invoke(&request, &response, &mut self.vars, &mut display);
        }

        self.persist(&request, &response);
        self.last_response = Some(response);
    }

    fn persist(&mut self, request: &HttpRequest, response: &ApiResponse) {
        let saved = self
            .store
            .save_exchange(request, response)
            .and_then(|_| self.store.save_variables(&self.vars));
        if let Err(e) = saved {
            tracing::error!(error = %e, "Failed to save exchange");
            self.display
                .lock()
                .print_styled(&format!("Failed to save: {:#}", e), STATUS_SERVER_ERROR, false);
        }
    }

    fn start_socket(&self, request: SocketIoRequest) -> Option<SocketClient> {
        self.display.lock().start();
        let summary = request.summary();
        match SocketClient::start(&self.runtime, request, self.display.clone()) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, request = %summary, "Cannot start Socket.IO session");
                self.display.lock().print_styled(
                    &format!("Cannot start {}: {:#}", summary, e),
                    STATUS_SERVER_ERROR,
                    false,
                );
                None
            }
        }
    }
}

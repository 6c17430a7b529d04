//! Per-project hooks run after a response arrives and before the menu shows

use crate::menu::Menu;
use crate::models::{ApiResponse, HttpRequest, Variables};
use crate::viewer::Display;

/// Runs after an HTTP response has been printed
pub trait ResponseHook {
    fn invoke(
        &self,
        request: &HttpRequest,
        response: &ApiResponse,
        vars: &mut Variables,
        display: &mut Display,
    );
}

/// Runs before every request menu draw
pub trait MenuHook {
    fn invoke(&self, vars: &Variables, menu: &mut Menu, last_response: Option<&ApiResponse>);
}

/// Does nothing
pub struct NoopHook;

impl ResponseHook for NoopHook {
    fn invoke(&self, _: &HttpRequest, _: &ApiResponse, _: &mut Variables, _: &mut Display) {}
}

impl MenuHook for NoopHook {
    fn invoke(&self, _: &Variables, _: &mut Menu, _: Option<&ApiResponse>) {}
}

/// Bumps the `next_id` variable after each response
pub struct IncrementId;

impl ResponseHook for IncrementId {
    fn invoke(&self, _: &HttpRequest, _: &ApiResponse, vars: &mut Variables, _: &mut Display) {
        let old_id = vars
            .get("next_id")
            .and_then(|id| id.parse::<i64>().ok())
            .unwrap_or(1);
        vars.set("next_id", (old_id + 1).to_string());
    }
}

/// Shows the current `location_key` under the menu
pub struct LocationInstructions;

impl MenuHook for LocationInstructions {
    fn invoke(&self, vars: &Variables, menu: &mut Menu, last_response: Option<&ApiResponse>) {
        let mut instructions = match vars.get("location_key").filter(|k| !k.is_empty()) {
            Some(location) => format!("location_key set to: {}", location),
            None => "There is currently no location_key set".to_string(),
        };
        let unauthorized = last_response.is_some_and(|r| {
            r.status_code.is_some_and(|code| code >= 400)
                && r.body
                    .as_ref()
                    .and_then(|b| b.get("Code"))
                    .and_then(|c| c.as_str())
                    == Some("Unauthorized")
        });
        if unauthorized {
            instructions = "You may need to upgrade your API key to access all methods".to_string();
        }
        menu.instructions = Some(instructions);
    }
}

pub fn response_hook(name: Option<&str>) -> Box<dyn ResponseHook> {
    match name {
        None | Some("") => Box::new(NoopHook),
        Some("increment_id") => Box::new(IncrementId),
        Some(other) => {
            tracing::warn!(hook = other, "Unknown response hook");
            Box::new(NoopHook)
        }
    }
}

pub fn menu_hook(name: Option<&str>) -> Box<dyn MenuHook> {
    match name {
        None | Some("") => Box::new(NoopHook),
        Some("location_instructions") => Box::new(LocationInstructions),
        Some(other) => {
            tracing::warn!(hook = other, "Unknown menu hook");
            Box::new(NoopHook)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Request, RequestDef};
    use crate::viewer::surface::testing::MemorySurface;
    use serde_json::json;

    fn request() -> HttpRequest {
        match RequestDef::default().build("http://localhost", &Variables::default()) {
            Some(Request::Http(request)) => request,
            _ => panic!("expected an HTTP request"),
        }
    }

    #[test]
    fn test_increment_id() {
        let mut display = Display::new(Box::new(MemorySurface::new(5, 20)));
        let mut vars = Variables::default();
        let hook = response_hook(Some("increment_id"));
        let response = ApiResponse::from_parts(200, 0.0, String::new());

        hook.invoke(&request(), &response, &mut vars, &mut display);
        assert_eq!(vars.get("next_id").unwrap(), "2");
        hook.invoke(&request(), &response, &mut vars, &mut display);
        assert_eq!(vars.get("next_id").unwrap(), "3");
    }

    #[test]
    fn test_location_instructions() {
        let hook = menu_hook(Some("location_instructions"));
        let mut menu = Menu::new("t", vec![]);
        let mut vars = Variables::default();

        hook.invoke(&vars, &mut menu, None);
        assert_eq!(menu.instructions.as_deref(), Some("There is currently no location_key set"));

        vars.set("location_key", "123");
        hook.invoke(&vars, &mut menu, None);
        assert_eq!(menu.instructions.as_deref(), Some("location_key set to: 123"));

        let denied = ApiResponse::from_parts(401, 0.0, json!({"Code": "Unauthorized"}).to_string());
        hook.invoke(&vars, &mut menu, Some(&denied));
        assert_eq!(
            menu.instructions.as_deref(),
            Some("You may need to upgrade your API key to access all methods")
        );
    }

    #[test]
    fn test_unknown_hook_is_noop() {
        let hook = menu_hook(Some("missing"));
        let mut menu = Menu::new("t", vec![]);
        hook.invoke(&Variables::default(), &mut menu, None);
        assert!(menu.instructions.is_none());
    }
}

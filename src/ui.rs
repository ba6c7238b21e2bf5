// UI layer: the demo screen, a simple interactive menu using `dialoguer`.
// It keeps the ephemeral demo state (session, prompt, spec id, preview URL)
// and turns every client call into a one-line alert. API failures never
// leave the loop; only terminal I/O errors do.

use crate::api::{ApiClient, Login};
use crate::error::ApiError;
use crate::models::{GenerationResult, PreviewResult, SwitchResult};
use crate::session::Session;
use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::{Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Map, Value};
use std::time::Duration;

pub const DEFAULT_PROMPT: &str = "Modern office room";
pub const DEFAULT_OBJECT_ID: &str = "obj_001";
pub const DEFAULT_MATERIAL: &str = "marble";

/// State shown and edited by the demo screen.
#[derive(Debug, Clone)]
pub struct DemoState {
    pub session: Option<Session>,
    pub refresh_token: Option<String>,
    pub prompt: String,
    pub spec_id: Option<String>,
    pub preview_url: Option<String>,
}

impl Default for DemoState {
    fn default() -> Self {
        DemoState {
            session: None,
            refresh_token: None,
            prompt: DEFAULT_PROMPT.to_string(),
            spec_id: None,
            preview_url: None,
        }
    }
}

impl DemoState {
    pub fn record_login(&mut self, login: &Login) -> Alert {
        self.adopt(login);
        Alert::success("Success", with_persist_note("Logged in successfully", login))
    }

    pub fn record_refresh(&mut self, login: &Login) -> Alert {
        self.adopt(login);
        Alert::success("Success", with_persist_note("Session refreshed", login))
    }

    fn adopt(&mut self, login: &Login) {
        self.session = Some(login.session.clone());
        if let Some(refresh) = login.response.refresh_token() {
            self.refresh_token = Some(refresh.to_string());
        }
    }

    pub fn record_generation(&mut self, result: &GenerationResult) -> Alert {
        self.spec_id = Some(result.spec_id.clone());
        self.preview_url = result.preview_url().map(str::to_string);
        Alert::success("Generated", format!("Spec ID: {}", result.spec_id))
    }

    pub fn record_switch(&mut self, result: &SwitchResult, material: &str) -> Alert {
        if let Some(url) = result.preview_url() {
            self.preview_url = Some(url.to_string());
        }
        Alert::success("Switched", format!("Material changed to {}", material))
    }

    pub fn record_preview(&mut self, result: &PreviewResult) -> Alert {
        self.preview_url = Some(result.preview_url.clone());
        Alert::success("Preview", result.preview_url.clone())
    }

    fn require_session(&self) -> std::result::Result<&Session, Alert> {
        self.session
            .as_ref()
            .ok_or_else(|| Alert::error("You should login first."))
    }

    fn require_spec(&self) -> std::result::Result<&str, Alert> {
        self.spec_id
            .as_deref()
            .ok_or_else(|| Alert::error("Generate a spec first."))
    }
}

/// One-shot message shown after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: &'static str,
    pub message: String,
    pub ok: bool,
}

impl Alert {
    pub fn success(title: &'static str, message: impl Into<String>) -> Self {
        Alert {
            title,
            message: message.into(),
            ok: true,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Alert {
            title: "Error",
            message: message.into(),
            ok: false,
        }
    }

    pub fn show(&self) {
        if self.ok {
            println!("{} {}", format!("{}:", self.title).green().bold(), self.message);
        } else {
            println!("{} {}", format!("{}:", self.title).red().bold(), self.message);
        }
    }
}

impl From<ApiError> for Alert {
    fn from(err: ApiError) -> Self {
        Alert::error(err.to_string())
    }
}

/// Main interactive menu. Runs until the user chooses "Exit".
pub fn main_menu(api: ApiClient) -> Result<()> {
    let mut state = DemoState::default();
    println!("{}", "BHIV Mobile Demo".bold());
    loop {
        if let Some(url) = &state.preview_url {
            println!("Preview: {}", url);
        }
        let items = vec![
            "Login",
            "Generate",
            "Switch material",
            "Preview",
            "Refresh session",
            "Resume saved session",
            "Exit",
        ];
        let selection = Select::new().items(&items).default(0).interact()?;
        let alert = match selection {
            0 => handle_login(&api, &mut state)?,
            1 => handle_generate(&api, &mut state)?,
            2 => handle_switch(&api, &mut state)?,
            3 => handle_preview(&api, &mut state),
            4 => handle_refresh(&api, &mut state),
            5 => handle_resume(&api, &mut state),
            6 => break,
            _ => continue,
        };
        alert.show();
    }
    Ok(())
}

fn handle_login(api: &ApiClient, state: &mut DemoState) -> Result<Alert> {
    let username: String = Input::new()
        .with_prompt("Username")
        .default("admin".to_string())
        .interact_text()?;
    let password: String = Password::new().with_prompt("Password").interact()?;

    let login = with_spinner("Logging in...", || api.login(&username, &password));
    Ok(match login {
        Ok(login) => state.record_login(&login),
        Err(e) => e.into(),
    })
}

fn handle_generate(api: &ApiClient, state: &mut DemoState) -> Result<Alert> {
    let session = match state.require_session() {
        Ok(s) => s.clone(),
        Err(alert) => return Ok(alert),
    };
    let prompt: String = Input::new()
        .with_prompt("Enter prompt")
        .default(state.prompt.clone())
        .interact_text()?;
    state.prompt = prompt;

    let result = with_spinner("Generating...", || {
        api.generate(&session, &state.prompt, Some(demo_context()))
    });
    Ok(match result {
        Ok(result) => state.record_generation(&result),
        Err(e) => e.into(),
    })
}

fn handle_switch(api: &ApiClient, state: &mut DemoState) -> Result<Alert> {
    let (session, spec_id) = match (state.require_session(), state.require_spec()) {
        (Ok(session), Ok(spec_id)) => (session.clone(), spec_id.to_string()),
        (Err(alert), _) | (_, Err(alert)) => return Ok(alert),
    };
    let object_id: String = Input::new()
        .with_prompt("Object id")
        .default(DEFAULT_OBJECT_ID.to_string())
        .interact_text()?;
    let material: String = Input::new()
        .with_prompt("Material")
        .default(DEFAULT_MATERIAL.to_string())
        .interact_text()?;

    let result = with_spinner("Switching...", || {
        api.switch(&session, &spec_id, &object_id, &material, None)
    });
    Ok(match result {
        Ok(result) => state.record_switch(&result, &material),
        Err(e) => e.into(),
    })
}

fn handle_preview(api: &ApiClient, state: &mut DemoState) -> Alert {
    let (session, spec_id) = match (state.require_session(), state.require_spec()) {
        (Ok(session), Ok(spec_id)) => (session.clone(), spec_id.to_string()),
        (Err(alert), _) | (_, Err(alert)) => return alert,
    };
    match with_spinner("Fetching preview...", || api.get_preview(&session, &spec_id)) {
        Ok(result) => state.record_preview(&result),
        Err(e) => e.into(),
    }
}

fn handle_refresh(api: &ApiClient, state: &mut DemoState) -> Alert {
    let Some(refresh_token) = state.refresh_token.clone() else {
        return Alert::error("No refresh token; login first.");
    };
    match with_spinner("Refreshing session...", || api.refresh(&refresh_token)) {
        Ok(login) => state.record_refresh(&login),
        Err(e) => e.into(),
    }
}

/// Reuse a token persisted by an earlier run. Nothing checks it here; an
/// expired token shows up as an error on the next call.
fn handle_resume(api: &ApiClient, state: &mut DemoState) -> Alert {
    match api.token_store().load() {
        Ok(Some(session)) => {
            state.session = Some(session);
            Alert::success("Success", "Resumed saved session")
        }
        Ok(None) => Alert::error("No saved session found."),
        Err(e) => e.into(),
    }
}

fn with_persist_note(message: &str, login: &Login) -> String {
    if login.persisted {
        message.to_string()
    } else {
        format!("{} (session not saved to disk)", message)
    }
}

/// Context the demo sends with every generation.
pub fn demo_context() -> Map<String, Value> {
    let mut context = Map::new();
    context.insert("style".to_string(), json!("modern"));
    context
}

/// Run `f` while a spinner is shown, clearing it afterwards.
fn with_spinner<T>(message: &'static str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let out = f();
    spinner.finish_and_clear();
    out
}

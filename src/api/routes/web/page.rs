//! The chat page, rendered with Handlebars. Handlebars escapes HTML by
//! default which matters here since both the user's input and the
//! model's output end up on the page.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use handlebars::Handlebars;

use super::public::{ModelOption, PageContext};
use crate::ai::chat::{RenderSink, Transcript, Turn};
use crate::core::{ModelAllowList, ModelId};

pub const PAGE_TEMPLATE: &str = "chat_page";

pub const TITLE: &str = "BITZZIE AI";

pub const GREETING: &str = "Hello! I'm your friendly AI assistant, BITZZIE. I can help answer \
your questions, provide information, or just chat. Let's start our conversation!";

const CHAT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{title}}</title>
  <style>
    body { background-color: #FFE6E6; font-family: sans-serif; margin: 0; display: flex; }
    aside { width: 16rem; padding: 20px; background: #f5f0fa; min-height: 100vh; }
    main { flex: 1; padding: 20px; max-width: 60rem; }
    h1, h2 { color: #7E57C2; }
    .user-message, .bot-message { background-color: black; color: white; padding: 15px; border-radius: 15px; margin: 10px 0; white-space: pre-wrap; }
    .user-message { border-left: 8px solid red; }
    .bot-message { border-left: 4px solid #7E57C2; }
    .error { background: #fff3f3; color: #b00020; border: 1px solid #b00020; padding: 10px; border-radius: 10px; }
    input[type=text] { width: 80%; border-radius: 20px; padding: 10px 15px; border: 1px solid #E0E0E0; }
  </style>
</head>
<body>
  <form method="post" action="/chat">
  <aside>
    <h2>SELECT MODEL</h2>
    <label for="model">Choose your model:</label>
    <select id="model" name="model">
      {{#each models}}
      <option value="{{id}}"{{#if selected}} selected{{/if}}>{{id}}</option>
      {{/each}}
    </select>
  </aside>
  <main>
    <h1>{{title}}</h1>
    <div class="bot-message">{{greeting}}</div>
    <div id="transcript">
      {{#each turns}}
      <div class="user-message"><b>You:</b> {{human_text}}</div>
      <div class="bot-message"><b>BITZZIE:</b> {{ai_text}}</div>
      {{/each}}
    </div>
    {{#if error}}
    <div class="error" role="alert">{{error}}</div>
    {{/if}}
    <input type="hidden" name="session_id" value="{{session_id}}">
    <label for="message">Ask BITZZIE anything:</label>
    <input type="text" id="message" name="message" autofocus autocomplete="off">
    <button type="submit">Send</button>
    <button type="submit" formaction="/reset">New chat</button>
  </main>
  </form>
</body>
</html>
"#;

pub fn templates() -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry
        .register_template_string(PAGE_TEMPLATE, CHAT_PAGE)
        .expect("Failed to register template");
    registry
}

/// Collects the latest render of a session and turns it into the chat
/// page. The last render wins.
pub struct PageSink {
    templates: Arc<Handlebars<'static>>,
    session_id: String,
    models: ModelAllowList,
    rendered: Option<(Vec<Turn>, Option<String>)>,
}

impl PageSink {
    pub fn new(
        templates: Arc<Handlebars<'static>>,
        session_id: &str,
        models: &ModelAllowList,
    ) -> Self {
        Self {
            templates,
            session_id: session_id.to_string(),
            models: models.clone(),
            rendered: None,
        }
    }

    /// Produces the page with `selected` as the chosen model. Takes the
    /// model here rather than in `new` since a cycle may switch it.
    pub fn into_html(self, selected: &ModelId) -> Result<String> {
        let Some((turns, error)) = self.rendered else {
            return Err(anyhow!(
                "Chat page for session {} was never rendered",
                self.session_id
            ));
        };

        let models: Vec<ModelOption> = self
            .models
            .iter()
            .map(|m| ModelOption {
                id: m.to_string(),
                selected: m == selected,
            })
            .collect();
        let context = PageContext {
            title: TITLE,
            greeting: GREETING,
            session_id: &self.session_id,
            models: &models,
            turns: &turns,
            error: error.as_deref(),
        };
        Ok(self.templates.render(PAGE_TEMPLATE, &context)?)
    }
}

impl RenderSink for PageSink {
    fn render(&mut self, transcript: &Transcript, error: Option<&str>) {
        self.rendered = Some((transcript.all().to_vec(), error.map(String::from)));
    }
}

// ABOUTME: Widget designer that renders an embeddable HTML+JS chat bubble for an assistant
// ABOUTME: Validates colors and avatar URLs and escapes every user-provided value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use crate::errors::{AppError, AppResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::LazyLock;
use uuid::Uuid;

const MAX_TEXT_CHARS: usize = 200;

static HEX_COLOR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").ok());

/// Corner the bubble is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetPosition {
    /// Bottom right corner
    #[default]
    BottomRight,
    /// Bottom left corner
    BottomLeft,
}

impl WidgetPosition {
    const fn css(self) -> &'static str {
        match self {
            Self::BottomRight => "right: 20px;",
            Self::BottomLeft => "left: 20px;",
        }
    }
}

/// Appearance of the embeddable widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetSettings {
    /// Header title
    pub title: String,
    /// Accent color, `#rgb` or `#rrggbb`
    pub primary_color: String,
    /// Anchor corner
    pub position: WidgetPosition,
    /// First message shown when the panel opens
    pub greeting: String,
    /// Input placeholder
    pub placeholder: String,
    /// Optional avatar image
    pub avatar_url: Option<String>,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            title: "Chat with us".to_owned(),
            primary_color: "#4f46e5".to_owned(),
            position: WidgetPosition::BottomRight,
            greeting: "Hi! How can I help you today?".to_owned(),
            placeholder: "Type your message...".to_owned(),
            avatar_url: None,
        }
    }
}

impl WidgetSettings {
    /// Check colors, lengths and the avatar URL
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` describing the first offending field
    pub fn validate(&self) -> AppResult<()> {
        if !HEX_COLOR
            .as_ref()
            .is_some_and(|re| re.is_match(&self.primary_color))
        {
            return Err(AppError::invalid_input(
                "primary_color must be a hex color like #4f46e5",
            ));
        }
        for (field, value) in [
            ("title", &self.title),
            ("greeting", &self.greeting),
            ("placeholder", &self.placeholder),
        ] {
            if value.chars().count() > MAX_TEXT_CHARS {
                return Err(AppError::invalid_input(format!(
                    "{field} exceeds {MAX_TEXT_CHARS} characters"
                )));
            }
        }
        if let Some(avatar) = self.avatar_url.as_deref() {
            let parsed = url::Url::parse(avatar)
                .map_err(|_| AppError::invalid_input("avatar_url must be an absolute URL"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AppError::invalid_input("avatar_url must use http or https"));
            }
        }
        Ok(())
    }
}

/// JSON literal safe to embed inside a `<script>` element
fn script_literal(value: &serde_json::Value) -> String {
    value
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

/// Render the standalone widget snippet
///
/// # Errors
///
/// Returns `INVALID_INPUT` when the settings do not validate
pub fn render_widget_html(
    assistant_id: Uuid,
    public_base_url: &str,
    settings: &WidgetSettings,
) -> AppResult<String> {
    settings.validate()?;

    let endpoint = format!(
        "{}/api/widget/{assistant_id}/chat",
        public_base_url.trim_end_matches('/')
    );
    let config = script_literal(&json!({
        "endpoint": endpoint,
        "greeting": settings.greeting,
        "storageKey": format!("airlab-widget-{assistant_id}"),
    }));
    let title_text = html_escape::encode_text(&settings.title);
    let title_attr = html_escape::encode_double_quoted_attribute(&settings.title);
    let placeholder_attr = html_escape::encode_double_quoted_attribute(&settings.placeholder);
    let avatar = settings.avatar_url.as_deref().map_or_else(String::new, |url| {
        format!(
            r#"<img class="airlab-avatar" src="{}" alt="">"#,
            html_escape::encode_double_quoted_attribute(url)
        )
    });
    let color = &settings.primary_color;
    let side = settings.position.css();

    Ok(format!(
        r#"<!-- Air Lab Assistant widget -->
<div id="airlab-widget-{assistant_id}" class="airlab-widget">
  <div class="airlab-panel" hidden>
    <div class="airlab-header">{avatar}<span>{title_text}</span></div>
    <div class="airlab-messages" aria-live="polite"></div>
    <form class="airlab-form">
      <input type="text" name="message" placeholder="{placeholder_attr}" autocomplete="off" required>
      <button type="submit">Send</button>
    </form>
  </div>
  <button type="button" class="airlab-bubble" aria-label="{title_attr}">&#128172;</button>
</div>
<style>
  #airlab-widget-{assistant_id} {{ position: fixed; bottom: 20px; {side} z-index: 2147483000; font-family: system-ui, sans-serif; }}
  #airlab-widget-{assistant_id} .airlab-bubble {{ width: 56px; height: 56px; border-radius: 50%; border: none; background: {color}; color: #fff; font-size: 24px; cursor: pointer; box-shadow: 0 4px 12px rgba(0,0,0,.2); }}
  #airlab-widget-{assistant_id} .airlab-panel {{ width: 340px; height: 460px; margin-bottom: 12px; display: flex; flex-direction: column; background: #fff; border-radius: 12px; box-shadow: 0 8px 24px rgba(0,0,0,.2); overflow: hidden; }}
  #airlab-widget-{assistant_id} .airlab-panel[hidden] {{ display: none; }}
  #airlab-widget-{assistant_id} .airlab-header {{ display: flex; align-items: center; gap: 8px; padding: 12px 16px; background: {color}; color: #fff; font-weight: 600; }}
  #airlab-widget-{assistant_id} .airlab-avatar {{ width: 28px; height: 28px; border-radius: 50%; }}
  #airlab-widget-{assistant_id} .airlab-messages {{ flex: 1; overflow-y: auto; padding: 12px; display: flex; flex-direction: column; gap: 8px; }}
  #airlab-widget-{assistant_id} .airlab-msg {{ max-width: 80%; padding: 8px 12px; border-radius: 12px; white-space: pre-wrap; line-height: 1.4; }}
  #airlab-widget-{assistant_id} .airlab-msg-user {{ align-self: flex-end; background: {color}; color: #fff; }}
  #airlab-widget-{assistant_id} .airlab-msg-assistant {{ align-self: flex-start; background: #f1f5f9; color: #0f172a; }}
  #airlab-widget-{assistant_id} .airlab-form {{ display: flex; border-top: 1px solid #e2e8f0; }}
  #airlab-widget-{assistant_id} .airlab-form input {{ flex: 1; border: none; padding: 12px; outline: none; }}
  #airlab-widget-{assistant_id} .airlab-form button {{ border: none; background: none; color: {color}; font-weight: 600; padding: 0 16px; cursor: pointer; }}
</style>
<script>
(function () {{
  var config = {config};
  var root = document.getElementById("airlab-widget-{assistant_id}");
  var panel = root.querySelector(".airlab-panel");
  var list = root.querySelector(".airlab-messages");
  var form = root.querySelector(".airlab-form");
  var input = form.querySelector("input");
  var sessionId = window.localStorage.getItem(config.storageKey);
  if (!sessionId) {{
    sessionId = window.crypto && window.crypto.randomUUID ? window.crypto.randomUUID() : String(Date.now()) + Math.random().toString(16).slice(2);
    window.localStorage.setItem(config.storageKey, sessionId);
  }}
  function add(role, text) {{
    var item = document.createElement("div");
    item.className = "airlab-msg airlab-msg-" + role;
    item.textContent = text;
    list.appendChild(item);
    list.scrollTop = list.scrollHeight;
  }}
  root.querySelector(".airlab-bubble").addEventListener("click", function () {{
    panel.hidden = !panel.hidden;
    if (!panel.hidden && !list.childElementCount && config.greeting) {{ add("assistant", config.greeting); }}
  }});
  form.addEventListener("submit", function (event) {{
    event.preventDefault();
    var text = input.value.trim();
    if (!text) {{ return; }}
    input.value = "";
    add("user", text);
    fetch(config.endpoint, {{
      method: "POST",
      headers: {{ "Content-Type": "application/json" }},
      body: JSON.stringify({{ session_id: sessionId, message: text }})
    }}).then(function (response) {{ return response.json(); }}).then(function (data) {{
      add("assistant", data.reply || data.error || "...");
    }}).catch(function () {{ add("assistant", "Connection error, please try again."); }});
  }});
}})();
</script>
"#
    ))
}

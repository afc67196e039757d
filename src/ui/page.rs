//! Page shell and widget markup.
//!
//! The markup follows a fixed DOM contract (`.chatbot-logo`, `.welcome-popup`,
//! `.chat-widget`, `.chat-messages`, `.typing-indicator`, `.chat-input`,
//! `.close-popup`). The inline bridge script only forwards DOM events and
//! applies server-rendered updates; it holds no widget logic.

use super::view::{RenderedMessage, WidgetView};
use crate::widget::format::escape_html;
use crate::widget::state::Message;

/// Forwards DOM events to the server and applies the updates it sends back.
const BRIDGE_SCRIPT: &str = r#"
(() => {
  const root = document.querySelector('[data-widget-id]');
  if (!root) return;
  const base = `/widget/${root.dataset.widgetId}`;
  const widget = root.querySelector('.chat-widget');
  const popup = root.querySelector('.welcome-popup');
  const logo = root.querySelector('.chatbot-logo');
  const list = root.querySelector('.chat-messages');
  const typing = root.querySelector('.typing-indicator');
  const textarea = root.querySelector('.chat-input textarea');
  const sendBtn = root.querySelector('.chat-input button');
  let generation = Number(root.dataset.draftGeneration || 0);
  let focused = false;

  const apply = (view) => {
    widget.className = view.widget_class;
    popup.className = view.popup_class;
    typing.className = view.typing_class;
    textarea.style.height = `${view.input_height}px`;
    textarea.style.overflowY = view.input_overflowing ? 'auto' : 'hidden';
    if (view.draft_generation > generation) {
      generation = view.draft_generation;
      textarea.value = '';
    }
    if (view.input_focused && !focused) textarea.focus();
    focused = view.input_focused;
  };

  const post = (event) =>
    fetch(`${base}/events`, {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(event),
    })
      .then((r) => (r.ok ? r.json() : null))
      .then((view) => view && apply(view))
      .catch((err) => console.error('widget event failed', err));

  logo.addEventListener('click', () => post({ type: 'logo_clicked' }));
  logo.addEventListener('mouseenter', () => post({ type: 'logo_hover_entered' }));
  logo.addEventListener('mouseleave', () => post({ type: 'logo_hover_exited' }));

  root.querySelectorAll('.close-popup').forEach((btn) =>
    btn.addEventListener('click', (e) => {
      e.stopPropagation();
      if (e.target.closest('.welcome-popup')) post({ type: 'popup_close_clicked' });
      else if (e.target.closest('.chat-widget')) post({ type: 'panel_close_clicked' });
    }),
  );

  textarea.addEventListener('input', () => {
    textarea.style.height = 'auto';
    post({ type: 'input_changed', value: textarea.value, scroll_height: textarea.scrollHeight });
  });
  textarea.addEventListener('keydown', (e) => {
    if (e.key !== 'Enter' || e.shiftKey) return;
    e.preventDefault();
    post({ type: 'enter_pressed', shift: false, value: textarea.value });
  });
  sendBtn.addEventListener('click', () => post({ type: 'send_clicked', value: textarea.value }));

  const stream = new EventSource(`${base}/stream`);
  stream.addEventListener('widget.state', (e) => apply(JSON.parse(e.data).data));
  stream.addEventListener('message.appended', (e) => {
    const msg = JSON.parse(e.data).data;
    if (list.querySelector(`[data-message-id="${msg.id}"]`)) return;
    list.insertAdjacentHTML('beforeend', msg.html);
    list.scrollTop = list.scrollHeight;
  });

  window.addEventListener('pagehide', () => {
    stream.close();
    fetch(base, { method: 'DELETE', keepalive: true }).catch(() => {});
  });
})();
"#;

/// Render the widget for `widget_id` in its current state.
pub fn render_widget(widget_id: &str, view: &WidgetView, transcript: &[Message]) -> String {
    let messages: String = transcript
        .iter()
        .map(|m| RenderedMessage::from_message(m).html)
        .collect();
    let widget_id = escape_html(widget_id);
    let autofocus = if view.input_focused { " autofocus" } else { "" };

    format!(
        r#"<div class="chat-root" data-widget-id="{widget_id}" data-draft-generation="{generation}">
    <button type="button" class="chatbot-logo" aria-label="Open chat">
        <svg viewBox="0 0 24 24" width="28" height="28" fill="none" stroke="currentColor" stroke-width="2">
            <path d="M21 15a2 2 0 0 1-2 2H7l-4 4V5a2 2 0 0 1 2-2h14a2 2 0 0 1 2 2z"/>
        </svg>
    </button>

    <div class="{popup_class}" role="status">
        <button type="button" class="close-popup" aria-label="Dismiss">&times;</button>
        <p>Hi there! Need help with an order? Ask me anything.</p>
    </div>

    <section class="{widget_class}" aria-label="Chat">
        <header class="chat-header">
            <h2>Assistant</h2>
            <button type="button" class="close-popup" aria-label="Close chat">&times;</button>
        </header>
        <div class="chat-messages" aria-live="polite">{messages}</div>
        <div class="{typing_class}"><span></span><span></span><span></span></div>
        <div class="chat-input">
            <textarea rows="1" placeholder="Type your message..." style="{input_style}"{autofocus}></textarea>
            <button type="button" aria-label="Send">Send</button>
        </div>
    </section>
</div>"#,
        generation = view.draft_generation,
        popup_class = view.popup_class,
        widget_class = view.widget_class,
        typing_class = view.typing_class,
        input_style = view.input_style(),
    )
}

/// Full HTML document hosting one widget.
pub fn html_shell(title: &str, widget_html: &str) -> String {
    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <link rel="stylesheet" href="/static/widget.css">
</head>
<body>
{widget_html}
<script>{BRIDGE_SCRIPT}</script>
</body>
</html>"#
    )
}

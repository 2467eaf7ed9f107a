//! Built-in portfolio page used when no `--page` file is given, plus canned
//! server responses so its forms and pagination have something to talk to.

use indoc::indoc;

use crate::ajax::{AjaxResponse, CannedTransport};

pub const DEMO_PAGE: &str = indoc! {r##"
    <header>
      <h1>Ada Folio</h1>
      <nav><a href="#projects">Projects</a> <a href="#contact">Contact</a> <a href="#">Top</a></nav>
      <button class="theme-toggle" aria-label="Toggle theme">Theme</button>
    </header>
    <main>
      <section id="about">
        <h2>About</h2>
        <p>Systems programmer who builds small, sharp tools.</p>
        <img alt="portrait" data-src="/img/portrait.png">
      </section>
      <section id="projects">
        <h2>Projects</h2>
        <div id="projects-grid">
          <div class="card">
            <h3>Tiny TSDB</h3>
            <button class="project-details" data-modal="#tpl-tsdb">Details</button>
          </div>
          <div class="card">
            <h3>Packet Lens</h3>
            <button class="project-details" data-modal="#tpl-lens">Details</button>
          </div>
        </div>
        <div>
          <button class="load-more" data-url="/api/projects">Load more</button>
          <p class="load-more-status"></p>
        </div>
      </section>
      <section id="contact">
        <h2>Contact</h2>
        <form id="contact-form">
          <div><input name="name" placeholder="Name"></div>
          <div><input name="email" placeholder="Email"></div>
          <div><input name="subject" placeholder="Subject"></div>
          <div><textarea name="message" placeholder="Message"></textarea></div>
          <button type="submit">Send</button>
          <p class="form-status"></p>
        </form>
      </section>
      <img alt="footer banner" data-src="/img/banner.png">
    </main>
    <div id="tpl-tsdb" hidden>
      <h3>Tiny TSDB</h3>
      <p>An append-only time series store with a columnar block format.</p>
      <a href="https://example.com/tsdb">Source</a>
      <button>Star</button>
    </div>
    <div id="tpl-lens" hidden>
      <h3>Packet Lens</h3>
      <p>Live protocol dissector for the terminal.</p>
      <a href="https://example.com/lens">Source</a>
    </div>
    <div class="modal" hidden>
      <div class="modal-content"></div>
      <button class="modal-close" aria-label="Close">Close</button>
    </div>
"##};

/// Responses for the demo page: two extra pages of projects and one
/// accepted contact message.
pub fn demo_transport() -> CannedTransport {
    let mut transport = CannedTransport::new();
    transport.respond(
        "/api/projects?page=2",
        &AjaxResponse {
            success: true,
            html: Some(
                r##"<div class="card"><h3>Shard Router</h3><button class="project-details" data-modal="<p>Consistent-hash request router.</p>">Details</button></div>"##
                    .to_string(),
            ),
            has_more: Some(true),
            ..AjaxResponse::default()
        },
    );
    transport.respond(
        "/api/projects?page=3",
        &AjaxResponse {
            success: true,
            html: Some(r#"<div class="card"><h3>Glyph Cache</h3><img alt="glyphs" data-src="/img/glyphs.png"></div>"#.to_string()),
            has_more: Some(false),
            ..AjaxResponse::default()
        },
    );
    transport.respond(
        "/api/contact",
        &AjaxResponse {
            success: true,
            message: Some("Thanks! I will get back to you soon.".to_string()),
            ..AjaxResponse::default()
        },
    );
    transport
}

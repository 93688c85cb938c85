//! Example: Basic usage of nodeset

use std::rc::Rc;

use nodeset::{Collection, Config, Event, ExtensionRegistry, Listener, Page, Plugin, PluginInfo, Value};

/// Tabs widget: shows the panel matching the clicked tab
struct Tabs;

impl Plugin for Tabs {
    fn info(&self) -> PluginInfo {
        PluginInfo { name: "tabs", version: "0.1.0" }
    }

    fn register(&self, registry: &mut ExtensionRegistry) {
        registry.register_fn("tabs", |tabs: &mut Collection, _args: &[Value]| {
            let page = tabs.page().clone();
            let listener = Listener::new(move |event: &mut Event| {
                let Some(target) = event.target else {
                    return;
                };
                let Ok(tab) = page.wrap(target) else {
                    return;
                };
                let Some(panel) = tab.get_data("panel") else {
                    return;
                };
                if let Ok(mut panels) = page.wrap(".panel") {
                    panels.hide();
                }
                if let Ok(mut shown) = page.wrap(format!("#{panel}").as_str()) {
                    shown.fade_in(200.0, None);
                }
            });
            tabs.find("[data-panel]")?.on_click(&listener);
            Ok(Value::from(tabs.len()))
        });
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    nodeset::logging::init();

    let config = Config::from_json(r#"{ "url": "https://example.com/admin" }"#)?;
    let page = Page::from_html(
        r#"<nav id="tabs">
             <button data-panel="users">Users</button>
             <button data-panel="roles">Roles</button>
           </nav>
           <section class="panel" id="users">users</section>
           <section class="panel" id="roles" style="display: none">roles</section>"#,
        config,
    )?;

    println!("nodeset v{} loaded {}", nodeset::VERSION, page.config().url);

    page.install(&Tabs);
    let buttons = page.wrap("#tabs")?.call("tabs", &[])?;
    println!("tabs bound to {buttons} buttons");

    let done: nodeset::Callback = Rc::new(|| println!("roles panel visible"));
    page.wrap("button[data-panel=roles]")?.simulate_click();
    page.wrap("#roles")?.fade_in(200.0, Some(done));
    page.advance(400.0);

    println!("users: display={:?}", page.wrap("#users")?.computed_display());
    println!("roles: opacity={:?}", page.wrap("#roles")?.get_css("opacity"));
    println!("{}", page.wrap("body")?.get_html().unwrap_or_default());
    Ok(())
}

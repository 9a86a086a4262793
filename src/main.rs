//! Seesaw Simulation entry point
//!
//! The browser build binds DOM events to the coordinator and draws each
//! frame into plain DOM elements. The native build runs a short headless demo.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement, HtmlInputElement, MouseEvent};

    use seesaw_sim::SeesawManager;
    use seesaw_sim::audio::AudioManager;
    use seesaw_sim::config::SeesawConfig;
    use seesaw_sim::persistence::{KeyValueStore, LocalStorage, MemoryStore, PersistenceError};
    use seesaw_sim::sim::{Lean, SceneView, Stats};

    /// LocalStorage when the browser allows it, memory otherwise
    enum AppStore {
        Local(LocalStorage),
        Memory(MemoryStore),
    }

    impl AppStore {
        fn open() -> Self {
            match LocalStorage::open() {
                Some(storage) => Self::Local(storage),
                None => {
                    log::warn!("LocalStorage unavailable - seesaws will not persist");
                    Self::Memory(MemoryStore::new())
                }
            }
        }
    }

    impl KeyValueStore for AppStore {
        fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
            match self {
                Self::Local(s) => s.get(key),
                Self::Memory(s) => s.get(key),
            }
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
            match self {
                Self::Local(s) => s.set(key, value),
                Self::Memory(s) => s.set(key, value),
            }
        }

        fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
            match self {
                Self::Local(s) => s.remove(key),
                Self::Memory(s) => s.remove(key),
            }
        }
    }

    /// App instance holding the coordinator and DOM handles
    struct App {
        manager: SeesawManager<AppStore>,
        audio: AudioManager,
        document: Document,
        container: HtmlElement,
        plank: Option<HtmlElement>,
        ruler: Option<HtmlElement>,
        objects: HashMap<u32, HtmlElement>,
        preview_line: Option<HtmlElement>,
        preview_ghost: Option<HtmlElement>,
        // Seesaw and ruler width currently drawn
        drawn_id: Option<u32>,
        drawn_ruler_width: f64,
        // Tabs, log and slider need a redraw
        dirty: bool,
    }

    impl App {
        fn new(document: Document, container: HtmlElement, seed: u64) -> Self {
            let store = AppStore::open();
            let config = SeesawConfig::load(&store);
            let plank = query_html(&container, ".seesaw-plank");
            let ruler = query_html(&container, ".ruler");
            Self {
                manager: SeesawManager::new(store, config, seed),
                audio: AudioManager::new(),
                document,
                container,
                plank,
                ruler,
                objects: HashMap::new(),
                preview_line: None,
                preview_ghost: None,
                drawn_id: None,
                drawn_ruler_width: 0.0,
                dirty: true,
            }
        }

        /// Forward queued simulation events to audio
        fn play_events(&mut self) {
            let events = self.manager.drain_events();
            if events.is_empty() {
                return;
            }
            for event in &events {
                self.audio.play_event(event);
            }
            self.dirty = true;
        }

        fn render(&mut self) {
            let Some(view) = self.manager.view() else { return };

            if self.drawn_id != self.manager.active_id() {
                for (_, el) in self.objects.drain() {
                    el.remove();
                }
                self.drawn_id = self.manager.active_id();
                self.drawn_ruler_width = 0.0;
                self.dirty = true;
            }

            self.render_plank(&view);
            self.render_objects(&view);
            self.render_preview(&view);
            if let Some(stats) = self.manager.stats() {
                self.render_stats(&stats);
            }

            if self.dirty {
                self.render_log();
                self.render_tabs();
                self.sync_slider(view.plank_width);
                self.dirty = false;
            }
        }

        fn render_plank(&mut self, view: &SceneView) {
            if let Some(plank) = &self.plank {
                set_style(plank, "width", &format!("{}px", view.plank_width));
                set_style(
                    plank,
                    "transform",
                    &format!("translate(-50%, -100%) rotate({}deg)", view.angle_deg),
                );
            }

            let Some(ruler) = &self.ruler else { return };
            if self.drawn_ruler_width == view.plank_width {
                return;
            }
            self.drawn_ruler_width = view.plank_width;
            set_style(ruler, "width", &format!("{}px", view.plank_width));
            ruler.set_inner_html("");
            let half = view.plank_width / 2.0;
            for tick in &view.ruler {
                let mut class = String::from("ruler-tick");
                if tick.major {
                    class.push_str(" major");
                }
                if tick.center {
                    class.push_str(" center");
                }
                let Some(el) = create_div(&self.document, &class) else { continue };
                set_style(&el, "left", &format!("{}px", tick.position + half));
                if tick.major {
                    el.set_text_content(Some(&tick.label));
                }
                let _ = ruler.append_child(&el);
            }
        }

        /// Create, move and remove object elements to match the view
        fn render_objects(&mut self, view: &SceneView) {
            self.objects.retain(|id, el| {
                let keep = view.objects.iter().any(|o| o.id == *id);
                if !keep {
                    el.remove();
                }
                keep
            });

            for obj in &view.objects {
                if !self.objects.contains_key(&obj.id) {
                    let Some(el) = create_div(&self.document, "object") else { continue };
                    set_style(&el, "width", &format!("{}px", obj.diameter));
                    set_style(&el, "height", &format!("{}px", obj.diameter));
                    set_style(&el, "background", &obj.color);
                    el.set_text_content(Some(&obj.label));
                    let _ = self.container.append_child(&el);
                    self.objects.insert(obj.id, el);
                }
                if let Some(el) = self.objects.get(&obj.id) {
                    set_style(el, "left", &format!("{}px", obj.x));
                    set_style(el, "top", &format!("{}px", obj.y));
                }
            }
        }

        fn render_preview(&mut self, view: &SceneView) {
            let Some(preview) = &view.preview else {
                for el in [&self.preview_line, &self.preview_ghost].into_iter().flatten() {
                    set_style(el, "display", "none");
                }
                return;
            };

            if self.preview_line.is_none() {
                self.preview_line = create_div(&self.document, "preview-line");
                if let Some(el) = &self.preview_line {
                    let _ = self.container.append_child(el);
                }
            }
            if self.preview_ghost.is_none() {
                self.preview_ghost = create_div(&self.document, "preview-object");
                if let Some(el) = &self.preview_ghost {
                    let _ = self.container.append_child(el);
                }
            }

            if let Some(line) = &self.preview_line {
                set_style(line, "display", "block");
                set_style(line, "left", &format!("{}px", preview.line_x));
                set_style(line, "top", &format!("{}px", preview.line_top));
                set_style(line, "height", &format!("{}px", preview.line_height));
            }
            if let Some(ghost) = &self.preview_ghost {
                set_style(ghost, "display", "flex");
                set_style(ghost, "width", &format!("{}px", preview.diameter));
                set_style(ghost, "height", &format!("{}px", preview.diameter));
                set_style(ghost, "left", &format!("{}px", preview.ghost_x));
                set_style(ghost, "top", &format!("{}px", preview.ghost_y));
                set_style(ghost, "background", &preview.color);
                ghost.set_text_content(Some(&preview.label));
            }
        }

        fn render_stats(&self, stats: &Stats) {
            let doc = &self.document;
            set_text(doc, "leftWeight", &format!("{:.1} kg", stats.left_weight));
            set_text(doc, "rightWeight", &format!("{:.1} kg", stats.right_weight));
            set_text(doc, "nextWeight", &format!("{} kg", stats.next_weight));
            set_text(doc, "angle", &format!("{:.1}°", stats.angle));
            set_text(doc, "leftTorqueDisplay", &format!("{:.0}", stats.left_torque));
            set_text(doc, "rightTorqueDisplay", &format!("{:.0}", stats.right_torque));
            set_text(doc, "netTorque", &format!("{:+.0}", stats.net_torque));
            set_text(doc, "leftFormula", &stats.left_formula);
            set_text(doc, "rightFormula", &stats.right_formula);

            if let Some(el) = doc.get_element_by_id("balanceIndicator") {
                let class = match stats.lean {
                    Lean::Left => "balance-indicator left",
                    Lean::Right => "balance-indicator right",
                    Lean::Level => "balance-indicator",
                };
                el.set_class_name(class);
            }
        }

        fn render_log(&self) {
            let Some(log_el) = self.document.get_element_by_id("log") else { return };
            log_el.set_inner_html("");
            let Some(seesaw) = self.manager.active() else { return };
            for entry in seesaw.log.entries() {
                if let Some(el) = create_div(&self.document, "log-entry") {
                    el.set_text_content(Some(entry));
                    let _ = log_el.append_child(&el);
                }
            }
        }

        fn render_tabs(&self) {
            let Some(tabs) = self.document.get_element_by_id("seesawTabs") else { return };
            tabs.set_inner_html("");
            let removable = self.manager.seesaws().len() > 1;

            for seesaw in self.manager.seesaws() {
                let class = if Some(seesaw.id) == self.manager.active_id() {
                    "seesaw-tab active"
                } else {
                    "seesaw-tab"
                };
                let Some(tab) = create_div(&self.document, class) else { continue };
                let _ = tab.set_attribute("data-id", &seesaw.id.to_string());

                if let Ok(name) = self.document.create_element("span") {
                    name.set_class_name("tab-name");
                    name.set_text_content(Some(&seesaw.name));
                    let _ = tab.append_child(&name);
                }
                if removable {
                    if let Ok(close) = self.document.create_element("span") {
                        close.set_class_name("tab-close");
                        close.set_text_content(Some("×"));
                        let _ = tab.append_child(&close);
                    }
                }
                let _ = tabs.append_child(&tab);
            }

            if self.manager.can_add() {
                if let Some(add) = create_div(&self.document, "seesaw-tab add-tab") {
                    add.set_text_content(Some("+"));
                    add.set_title("Add seesaw");
                    let _ = tabs.append_child(&add);
                }
            }
        }

        fn sync_slider(&self, width: f64) {
            if let Some(slider) = self
                .document
                .get_element_by_id("plankWidthSlider")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            {
                slider.set_value(&width.to_string());
            }
            set_text(&self.document, "plankWidthValue", &format!("{width}px"));
        }
    }

    fn query_html(root: &HtmlElement, selector: &str) -> Option<HtmlElement> {
        root.query_selector(selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn create_div(document: &Document, class: &str) -> Option<HtmlElement> {
        let el = document
            .create_element("div")
            .ok()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        el.set_class_name(class);
        Some(el)
    }

    fn set_style(el: &HtmlElement, property: &str, value: &str) {
        let _ = el.style().set_property(property, value);
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    /// Pointer position relative to the container center
    fn center_relative(container: &HtmlElement, event: &MouseEvent) -> (f64, f64) {
        let rect = container.get_bounding_client_rect();
        let center_x = rect.left() + rect.width() / 2.0;
        let center_y = rect.top() + rect.height() / 2.0;
        (
            f64::from(event.client_x()) - center_x,
            f64::from(event.client_y()) - center_y,
        )
    }

    /// Seesaw id of the tab containing an event target
    fn tab_id(target: &Element) -> Option<u32> {
        target
            .closest(".seesaw-tab")
            .ok()
            .flatten()?
            .get_attribute("data-id")?
            .parse()
            .ok()
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Seesaw Simulation starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document - cannot start");
            return;
        };
        let Some(container) = document
            .get_element_by_id("seesawContainer")
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            log::error!("Missing #seesawContainer");
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(document.clone(), container.clone(), seed)));

        {
            let a = app.borrow();
            let config = a.manager.config();
            if let Some(slider) = document
                .get_element_by_id("plankWidthSlider")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            {
                slider.set_min(&config.min_plank_width.to_string());
                slider.set_max(&config.max_plank_width.to_string());
            }
        }

        setup_pointer_handlers(&container, app.clone());
        setup_controls(&document, app.clone());
        setup_tabs(&document, app.clone());

        log::info!("Starting animation loop");
        request_animation_frame(app);
    }

    fn setup_pointer_handlers(container: &HtmlElement, app: Rc<RefCell<App>>) {
        // Hover preview
        {
            let app = app.clone();
            let container_clone = container.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let (x, y) = center_relative(&container_clone, &event);
                app.borrow_mut().manager.on_pointer_move(x, y);
            });
            let _ = container
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Drop
        {
            let app = app.clone();
            let container_clone = container.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let (x, y) = center_relative(&container_clone, &event);
                let mut a = app.borrow_mut();
                a.audio.resume();
                a.manager.on_click(x, y);
                a.play_events();
            });
            let _ = container
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().manager.on_pointer_leave();
            });
            let _ = container
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_controls(document: &Document, app: Rc<RefCell<App>>) {
        if let Some(btn) = document.get_element_by_id("resetBtn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                a.audio.resume();
                a.manager.reset_active();
                a.play_events();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(slider) = document
            .get_element_by_id("plankWidthSlider")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            let slider_clone = slider.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Ok(requested) = slider_clone.value().parse::<f64>() else { return };
                let mut a = app.borrow_mut();
                a.manager.set_plank_width(requested);
                a.play_events();
            });
            let _ = slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_tabs(document: &Document, app: Rc<RefCell<App>>) {
        let Some(tabs) = document.get_element_by_id("seesawTabs") else { return };

        // One delegated listener; the tab bar is rebuilt on every change
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok())
                else {
                    return;
                };
                let mut a = app.borrow_mut();

                let result = if target.closest(".add-tab").ok().flatten().is_some() {
                    a.manager.add_seesaw().map(|_| ())
                } else if let Some(id) = tab_id(&target) {
                    if target.closest(".tab-close").ok().flatten().is_some() {
                        a.manager.remove_seesaw(id)
                    } else {
                        a.manager.switch_to(id)
                    }
                } else {
                    return;
                };

                if let Err(e) = result {
                    log::warn!("{e}");
                }
                a.play_events();
                a.dirty = true;
            });
            let _ = tabs.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Double-click a tab to rename it
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let Some(id) = event
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .and_then(|el| tab_id(&el))
                else {
                    return;
                };
                let current = app
                    .borrow()
                    .manager
                    .get(id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default();
                let Some(window) = web_sys::window() else { return };
                let Ok(Some(name)) =
                    window.prompt_with_message_and_default("Seesaw name", &current)
                else {
                    return;
                };
                let mut a = app.borrow_mut();
                if let Err(e) = a.manager.rename_seesaw(id, &name) {
                    log::warn!("{e}");
                }
                a.dirty = true;
            });
            let _ = tabs.add_event_listener_with_callback("dblclick", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |_time: f64| {
            frame(app);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame(app: Rc<RefCell<App>>) {
        {
            let mut a = app.borrow_mut();
            a.manager.tick();
            a.play_events();
            a.render();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use seesaw_sim::SeesawManager;
    use seesaw_sim::config::SeesawConfig;
    use seesaw_sim::consts::TICK_RATE;
    use seesaw_sim::persistence::MemoryStore;

    env_logger::init();
    log::info!("Seesaw Simulation (native) starting...");
    log::info!("Native mode runs a headless demo - serve the wasm build for the interactive version");

    let mut manager = SeesawManager::new(MemoryStore::new(), SeesawConfig::default(), 7);

    // Drop a few objects, one second apart
    for (x, y) in [(-120.0, 0.0), (80.0, 0.0), (160.0, 5.0), (-40.0, -10.0)] {
        manager.on_click(x, y);
        for _ in 0..TICK_RATE as usize {
            manager.tick();
        }
    }
    for event in manager.drain_events() {
        log::debug!("{event:?}");
    }

    let Some(stats) = manager.stats() else { return };
    println!("Left:  {:>6.0}  ({})", stats.left_torque, stats.left_formula);
    println!("Right: {:>6.0}  ({})", stats.right_torque, stats.right_formula);
    println!("Net:   {:>+6.0}  angle {:.1}°  {:?}", stats.net_torque, stats.angle, stats.lean);
    if let Some(seesaw) = manager.active() {
        for entry in seesaw.log.entries() {
            println!("  {entry}");
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

//! Canvas RPG entry point
//!
//! Handles platform-specific initialization and runs the game loop. On the
//! web the DOM is the UI surface and a 2D canvas context draws the entities;
//! natively a headless runner plays a scripted session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement,
        HtmlInputElement, HtmlMediaElement,
    };

    use canvas_rpg::consts::SIM_DT;
    use canvas_rpg::sim::{Archetype, EntityKind, GameEvent, Gender, PlayerStats, RunSummary};
    use canvas_rpg::ui::{Screen, UiSurface, hud_lines};
    use canvas_rpg::{Session, SessionCommand, Settings};

    /// DOM-backed UI surface
    struct DomSurface {
        document: Document,
    }

    impl DomSurface {
        fn media(&self, id: &str) -> Option<HtmlMediaElement> {
            self.document.get_element_by_id(id)?.dyn_into().ok()
        }

        fn play(&self, id: &str) {
            if let Some(media) = self.media(id) {
                if let Err(e) = media.play() {
                    log::error!("Audio playback failed: {:?}", e);
                }
            }
        }

        fn apply_volumes(&self, settings: &Settings) {
            if let Some(music) = self.media("bg-music") {
                music.set_volume(settings.music_volume as f64);
            }
            if let Some(sfx) = self.media("sfx-click") {
                sfx.set_volume(settings.sfx_volume as f64);
            }
        }

        fn play_click(&self) {
            if let Some(sfx) = self.media("sfx-click") {
                sfx.set_current_time(0.0);
            }
            self.play("sfx-click");
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }
    }

    impl UiSurface for DomSurface {
        fn show_screen(&mut self, screen: Screen) {
            log::info!("showScreen: {:?}", screen);
            for s in Screen::ALL {
                let Some(el) = self
                    .document
                    .get_element_by_id(s.element_id())
                    .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                else {
                    continue;
                };
                let display = if s == screen { s.display() } else { "none" };
                let _ = el.style().set_property("display", display);
            }
            if screen == Screen::Title {
                self.play("bg-music");
            }
            if screen == Screen::Game {
                self.set_text("notice", "");
            }
        }

        fn publish_stats(&mut self, stats: &PlayerStats) {
            let [level, experience, health] = hud_lines(stats);
            self.set_text("level", &level);
            self.set_text("experience", &experience);
            self.set_text("health", &health);
        }

        fn game_over(&mut self, summary: &RunSummary) {
            log::info!(
                "Game Over! {} reached level {} ({} orbs)",
                summary.archetype,
                summary.level,
                summary.orbs_collected
            );
        }

        fn game_event(&mut self, event: &GameEvent) {
            if let GameEvent::LevelUp { level } = event {
                self.set_text("notice", &format!("Level {level}!"));
            }
        }

        fn prompt(&mut self, message: &str) {
            if let Some(window) = web_sys::window() {
                let _ = window.alert_with_message(message);
            }
        }
    }

    /// Game instance holding all state
    struct App {
        session: Session,
        ui: DomSurface,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        last_time: f64,
    }

    impl App {
        /// Render the current frame
        fn render(&self) {
            let w = self.canvas.width() as f64;
            let h = self.canvas.height() as f64;
            self.ctx.set_fill_style_str("#1a1a2e");
            self.ctx.fill_rect(0.0, 0.0, w, h);

            if self.session.screen() != Screen::Game {
                return;
            }
            let Some(snapshot) = self.session.snapshot() else {
                return;
            };
            if let Some(player) = snapshot.player {
                self.ctx.set_fill_style_str("#8a6dff");
                self.ctx.fill_rect(
                    player.pos.x as f64,
                    player.pos.y as f64,
                    player.size.x as f64,
                    player.size.y as f64,
                );
            }
            for entity in &snapshot.entities {
                let color = match entity.kind {
                    EntityKind::Enemy => "#ff4444",
                    EntityKind::ExperienceOrb => "#44ddff",
                };
                self.ctx.set_fill_style_str(color);
                let b = entity.bounds;
                self.ctx.fill_rect(
                    b.pos.x as f64,
                    b.pos.y as f64,
                    b.size.x as f64,
                    b.size.y as f64,
                );
            }
        }

        fn resize_canvas(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            if width <= 0.0 || height <= 0.0 {
                return;
            }
            self.canvas.set_width(width as u32);
            self.canvas.set_height(height as u32);
            if let Err(e) = self.session.resize(width as f32, height as f32) {
                log::warn!("Ignoring resize: {}", e);
            }
        }
    }

    fn exit() {
        if let Some(window) = web_sys::window() {
            let _ = window.close();
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Canvas RPG starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let settings = Settings::load();
        let ui = DomSurface {
            document: document.clone(),
        };
        ui.apply_volumes(&settings);
        let session = Session::new(settings).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let app = Rc::new(RefCell::new(App {
            session,
            ui,
            canvas,
            ctx,
            last_time: 0.0,
        }));

        {
            let mut g = app.borrow_mut();
            g.resize_canvas();
            let g = &mut *g;
            g.session.show_title(&mut g.ui);
        }

        setup_window_handlers(app.clone());
        setup_menu_buttons(&document, app.clone());
        setup_character_creation(&document, app.clone())?;
        setup_volume_sliders(&document, app.clone());

        request_animation_frame(app);

        log::info!("Canvas RPG running!");
        Ok(())
    }

    fn setup_window_handlers(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let command = app.borrow_mut().session.key_down(&event.key());
                if command == Some(SessionCommand::Exit) {
                    exit();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                app.borrow_mut().session.key_up(&event.key());
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur drops held keys so the player doesn't drift
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().session.release_keys();
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().resize_canvas();
            });
            let _ =
                window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(element: &Element, mut handler: impl FnMut() + 'static) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| handler());
        let _ = element.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_menu_buttons(document: &Document, app: Rc<RefCell<App>>) {
        // Click sound on every button
        if let Ok(buttons) = document.query_selector_all("button") {
            for i in 0..buttons.length() {
                let Some(button) = buttons.get(i).and_then(|n| n.dyn_into::<Element>().ok())
                else {
                    continue;
                };
                let app = app.clone();
                on_click(&button, move || app.borrow().ui.play_click());
            }
        }

        let bind = |id: &str, action: fn(&mut App)| {
            if let Some(btn) = document.get_element_by_id(id) {
                let app = app.clone();
                on_click(&btn, move || action(&mut app.borrow_mut()));
            }
        };
        bind("new-game-btn", |g| g.session.new_game(&mut g.ui));
        bind("load-game-btn", |g| g.session.load_game(&mut g.ui));
        bind("options-btn", |g| g.session.open_options(&mut g.ui));
        bind("options-back-btn", |g| g.session.show_title(&mut g.ui));
        bind("creation-back-btn", |g| g.session.show_title(&mut g.ui));
        bind("exit-rpg-btn", |_| exit());
    }

    fn setup_character_creation(document: &Document, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let cards = document.query_selector_all(".class-card")?;
        for i in 0..cards.length() {
            let Some(card) = cards.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let class = card.get_attribute("data-class").unwrap_or_default();
            let archetype = match class.parse::<Archetype>() {
                Ok(a) => Some(a),
                Err(e) => {
                    log::error!("Class card: {}", e);
                    None
                }
            };

            let gender_buttons = card.query_selector_all(".gender-btn")?;
            let siblings: Vec<Element> = (0..gender_buttons.length())
                .filter_map(|j| gender_buttons.get(j))
                .filter_map(|n| n.dyn_into::<Element>().ok())
                .collect();
            for button in &siblings {
                let gender = button
                    .get_attribute("data-gender")
                    .and_then(|g| g.parse::<Gender>().ok());
                let (Some(archetype), Some(gender)) = (archetype, gender) else {
                    continue;
                };
                let app = app.clone();
                let siblings = siblings.clone();
                let clicked = button.clone();
                on_click(button, move || {
                    for s in &siblings {
                        let _ = s.class_list().remove_1("active");
                    }
                    let _ = clicked.class_list().add_1("active");
                    app.borrow_mut().session.select_gender(archetype, gender);
                });
            }

            if let Some(choose) = card.query_selector(".choose-class-btn")? {
                let app = app.clone();
                on_click(&choose, move || {
                    let seed = js_sys::Date::now() as u64;
                    let mut g = app.borrow_mut();
                    let g = &mut *g;
                    if let Err(e) = g.session.choose_class(&class, seed, &mut g.ui) {
                        log::warn!("Character creation rejected: {}", e);
                    }
                });
            }
        }
        Ok(())
    }

    fn setup_volume_sliders(document: &Document, app: Rc<RefCell<App>>) {
        let bind = |id: &str, apply: fn(&mut Settings, f32)| {
            let Some(slider) = document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            let app = app.clone();
            let input = slider.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = app.borrow_mut();
                let value = input.value().parse::<f32>().unwrap_or(100.0);
                apply(&mut g.session.settings, value);
                g.ui.apply_volumes(&g.session.settings);
                g.session.settings.save();
            });
            let _ =
                slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        };
        bind("music-volume", Settings::set_music_slider);
        bind("sfx-volume", Settings::set_sfx_slider);
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut g = app.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            let g = &mut *g;
            g.session.frame(dt, &mut g.ui);
            g.render();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::init();
    let cli = headless::Cli::parse();
    log::info!("Canvas RPG (native) starting...");
    log::info!("Native mode is headless - serve the web build for the playable game");

    if let Err(e) = headless::run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted session driven at the fixed timestep
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use canvas_rpg::consts::SIM_DT;
    use canvas_rpg::sim::{Archetype, Gender};
    use canvas_rpg::ui::{LogSurface, Screen};
    use canvas_rpg::{Result, RpgError, Session, Settings};
    use clap::Parser;

    /// Movement pattern: each key held for one second in turn
    const SCRIPT: [&str; 4] = ["d", "s", "a", "w"];

    #[derive(Parser, Debug)]
    #[command(name = "canvas-rpg")]
    #[command(about = "Play a scripted headless run and print the run summary as JSON")]
    pub struct Cli {
        /// Number of fixed 60 Hz ticks to simulate
        #[arg(long, default_value_t = 3600)]
        pub ticks: u64,
        /// RNG seed for spawns
        #[arg(long, default_value_t = 0x5eed)]
        pub seed: u64,
        /// Character class: warrior, mage, rogue, priest or archer
        #[arg(long, default_value = "warrior", value_parser = parse_class)]
        pub class: Archetype,
        /// Settings JSON file (defaults are used when omitted)
        #[arg(long)]
        pub settings: Option<PathBuf>,
    }

    fn parse_class(s: &str) -> Result<Archetype> {
        s.parse()
    }

    fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
        let Some(path) = path else {
            return Ok(Settings::default());
        };
        let json = std::fs::read_to_string(path)
            .map_err(|e| RpgError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Settings::from_json(&json)
    }

    pub fn run(cli: Cli) -> Result<()> {
        let settings = load_settings(cli.settings.as_ref())?;
        let archetype = cli.class;

        let mut ui = LogSurface::default();
        let mut session = Session::new(settings)?;
        session.new_game(&mut ui);
        session.select_gender(archetype, Gender::Female);
        session.choose_class(archetype.as_str(), cli.seed, &mut ui)?;

        let mut held: Option<&str> = None;
        for t in 0..cli.ticks {
            let key = SCRIPT[(t / 60) as usize % SCRIPT.len()];
            if held != Some(key) {
                if let Some(prev) = held {
                    session.key_up(prev);
                }
                session.key_down(key);
                held = Some(key);
            }
            session.frame(SIM_DT, &mut ui);
            if session.screen() != Screen::Game {
                break;
            }
        }

        let Some(game) = session.game() else {
            return Ok(());
        };
        let stats = serde_json::to_string(&game.stats())?;
        log::info!("Final stats after {} ticks: {}", game.time_ticks, stats);
        let summary = serde_json::to_string_pretty(&game.summary())?;
        println!("{summary}");
        Ok(())
    }

}

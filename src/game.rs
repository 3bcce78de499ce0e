//! The game loop and application event loop.
//!
//! [`Game`] owns the renderer and the current scene and implements the
//! start/stop/frame contract. [`run`] wires a `Game` into a winit event
//! loop: scene construction and setup happen asynchronously during
//! application resume, after which every `RedrawRequested` event drives one
//! frame and, while the loop is playing, schedules the next one *before*
//! any frame work happens.
//!
//! # Loop lifecycle
//!
//! 1. `start` replaces the scene if one is supplied, marks the loop playing
//!    and awaits system and scene setup. Starting a playing loop is an
//!    error: there can never be two competing frame-scheduling chains.
//! 2. Each frame computes `dt` (zero on the first frame after a start),
//!    updates systems in order, updates the scene, then renders its root.
//! 3. `stop` only clears the playing flag; the in-flight frame completes
//!    and the loop simply stops rescheduling itself.

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::context::{Context, GameConfig, InitContext};
use crate::render::{Renderer, WgpuRenderer};
use crate::scene::{Scene, System};
use crate::time::FrameTimer;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Errors raised by the game loop's lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// `start` was called while the loop is already playing. Stop the loop
    /// first; restarting resets timestamp tracking.
    #[error("the game loop is already playing")]
    AlreadyPlaying,

    /// A system's or the scene's asynchronous setup failed.
    #[error("setup failed: {0}")]
    Setup(anyhow::Error),
}

/// The game handles operation of the entire game (duh).
///
/// It runs the update loop and dispatches lifecycle events to the injected
/// systems and the current scene. Rendering goes through the owned
/// [`Renderer`] handle.
pub struct Game<R: Renderer> {
    renderer: R,
    scene: Box<dyn Scene>,
    systems: Vec<Box<dyn System>>,
    timer: FrameTimer,
    playing: bool,
}

impl<R: Renderer> Game<R> {
    pub fn new(renderer: R, scene: Box<dyn Scene>) -> Self {
        Self::with_systems(renderer, scene, Vec::new())
    }

    /// Creates a game with per-frame systems. Systems run in the given
    /// order, during setup and ahead of the scene on every frame.
    pub fn with_systems(
        renderer: R,
        scene: Box<dyn Scene>,
        systems: Vec<Box<dyn System>>,
    ) -> Self {
        Self {
            renderer,
            scene,
            systems,
            timer: FrameTimer::new(),
            playing: false,
        }
    }

    /// Starts the loop.
    ///
    /// Replaces the current scene if one is supplied, marks the loop as
    /// playing, resets frame timing to the "no prior timestamp" state and
    /// awaits the systems' and the scene's asynchronous setup.
    ///
    /// Calling `start` while already playing is rejected with
    /// [`GameError::AlreadyPlaying`]. A failed setup leaves the loop
    /// stopped.
    pub async fn start(&mut self, scene: Option<Box<dyn Scene>>) -> Result<(), GameError> {
        if self.playing {
            return Err(GameError::AlreadyPlaying);
        }
        if let Some(scene) = scene {
            self.scene = scene;
        }
        self.playing = true;
        self.timer.reset();
        if let Err(e) = self.setup().await {
            self.playing = false;
            return Err(GameError::Setup(e));
        }
        Ok(())
    }

    async fn setup(&mut self) -> anyhow::Result<()> {
        for system in &mut self.systems {
            system.setup().await?;
        }
        self.scene.setup().await
    }

    /// Clears the playing flag.
    ///
    /// This is not immediate cancellation: the effect is observed at the
    /// next frame boundary, where the driver stops rescheduling. An
    /// in-flight frame always completes.
    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Runs one frame at `now`: computes `dt` (zero right after a start),
    /// updates systems then the scene, and renders the scene's root.
    ///
    /// Render failures are logged and never break the frame chain.
    pub fn frame(&mut self, now: Instant) {
        let dt = self.timer.tick(now);
        for system in &mut self.systems {
            system.update(dt);
        }
        self.scene.update(dt);
        if let Err(e) = self.renderer.render(self.scene.root_mut()) {
            log::error!("unable to render the current scene: {e}");
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn scene(&self) -> &dyn Scene {
        self.scene.as_ref()
    }
}

/// Type alias for a scene constructor (factory function).
///
/// A scene constructor takes an [`InitContext`] and asynchronously returns
/// a boxed [`Scene`]. This allows lazy initialization and resource loading
/// before the loop starts.
pub type SceneConstructor =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = anyhow::Result<Box<dyn Scene>>>>>>;

pub(crate) enum GameEvent {
    // This is the message from the wasm `spawn_local` init path.
    #[allow(dead_code)]
    Initialized(Box<Game<WgpuRenderer>>),
}

impl Debug for GameEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized(Game)"),
        }
    }
}

/// Winit application handler driving a [`Game`] over a window.
pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<GameEvent>,
    config: GameConfig,
    // We use Option to `take()` the constructor after use.
    constructor: Option<SceneConstructor>,
    game: Option<Game<WgpuRenderer>>,
}

impl App {
    fn new(
        event_loop: &EventLoop<GameEvent>,
        config: GameConfig,
        constructor: SceneConstructor,
    ) -> Self {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new().unwrap();
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config,
            constructor: Some(constructor),
            game: None,
        }
    }
}

impl ApplicationHandler<GameEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.game.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.width,
                self.config.height,
            ));

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = Arc::new(event_loop.create_window(window_attributes).unwrap());

        let constructor = self.constructor.take().unwrap();
        let config = self.config.clone();

        let init_future = async move {
            let ctx = Context::new(window, &config).await?;
            let scene = constructor((&ctx).into()).await?;
            let mut game = Game::new(WgpuRenderer::new(ctx), scene);
            game.start(None).await?;
            anyhow::Ok(game)
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(game) => {
                    game.renderer().context().window().request_redraw();
                    self.game = Some(game);
                }
                Err(e) => panic!("App initialization failed: {e}"),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok(game) => assert!(
                        proxy
                            .send_event(GameEvent::Initialized(Box::new(game)))
                            .is_ok()
                    ),
                    Err(e) => panic!("App initialization failed: {e}"),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: GameEvent) {
        match event {
            GameEvent::Initialized(game) => {
                let mut game = *game;

                // Important: trigger a resize and redraw now that we are
                // initialized.
                let size = game.renderer().context().window().inner_size();
                game.renderer_mut()
                    .context_mut()
                    .resize(size.width, size.height);
                game.renderer().context().window().request_redraw();
                self.game = Some(game);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let game = match &mut self.game {
            Some(game) => game,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => game
                .renderer_mut()
                .context_mut()
                .resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                // Schedule the next frame before doing any frame work so a
                // long frame cannot delay its successor's scheduling.
                if game.is_playing() {
                    game.renderer().context().window().request_redraw();
                }
                game.frame(Instant::now());
            }
            _ => {}
        }
    }
}

/// Builds the event loop, window and game, then runs until exit.
///
/// The scene is constructed asynchronously once the GPU context exists; on
/// the web the renderer surface is attached to the document's canvas.
pub fn run(config: GameConfig, constructor: SceneConstructor) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<GameEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config, constructor);

    event_loop.run_app(&mut app)?;

    Ok(())
}

use std::{sync::Arc, time::Instant};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorIcon, Window, WindowAttributes},
};

use crate::{
    config::{DisplayToggles, SceneConfig},
    error::SceneError,
    gfx::RenderEngine,
    interaction::CursorHint,
    lifecycle::{HostEvent, LifecycleManager, MountTarget, StrikeCommand},
    performance::PerformanceMonitor,
    scene::{ObjectId, Scene, SceneVariant},
    simulation::FrameSink,
    ui::{control_panel, SelectionReadout, UiCommand, UiManager},
};

/// Keyboard shortcuts mirroring the overlay controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    ToggleWireframe,
    ToggleStats,
    Regenerate,
    ToggleAutoRotate,
    StrikeAll,
    StrikeIndex(usize),
    ToggleAutoStrike,
    Exit,
}

impl Shortcut {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        let shortcut = match key {
            KeyCode::KeyW => Shortcut::ToggleWireframe,
            KeyCode::KeyS => Shortcut::ToggleStats,
            KeyCode::KeyR => Shortcut::Regenerate,
            KeyCode::KeyA => Shortcut::ToggleAutoRotate,
            KeyCode::Space => Shortcut::StrikeAll,
            KeyCode::KeyT => Shortcut::ToggleAutoStrike,
            KeyCode::Escape => Shortcut::Exit,
            KeyCode::Digit1 => Shortcut::StrikeIndex(0),
            KeyCode::Digit2 => Shortcut::StrikeIndex(1),
            KeyCode::Digit3 => Shortcut::StrikeIndex(2),
            KeyCode::Digit4 => Shortcut::StrikeIndex(3),
            KeyCode::Digit5 => Shortcut::StrikeIndex(4),
            KeyCode::Digit6 => Shortcut::StrikeIndex(5),
            KeyCode::Digit7 => Shortcut::StrikeIndex(6),
            KeyCode::Digit8 => Shortcut::StrikeIndex(7),
            KeyCode::Digit9 => Shortcut::StrikeIndex(8),
            _ => return None,
        };
        Some(shortcut)
    }

    /// Applies toggle shortcuts to `toggles`; anything else becomes a command
    pub fn apply(self, toggles: &mut DisplayToggles) -> Option<UiCommand> {
        match self {
            Shortcut::ToggleWireframe => toggles.toggle_wireframe(),
            Shortcut::ToggleStats => toggles.show_stats = !toggles.show_stats,
            Shortcut::ToggleAutoRotate => toggles.auto_rotate = !toggles.auto_rotate,
            Shortcut::ToggleAutoStrike => toggles.auto_strike = !toggles.auto_strike,
            Shortcut::Regenerate => return Some(UiCommand::Regenerate),
            Shortcut::StrikeAll => return Some(UiCommand::Strike(StrikeCommand::All)),
            Shortcut::StrikeIndex(index) => return Some(UiCommand::Strike(StrikeCommand::Index(index))),
            Shortcut::Exit => {}
        }
        None
    }
}

pub fn cursor_icon(hint: CursorHint) -> CursorIcon {
    match hint {
        CursorHint::Default => CursorIcon::Default,
        CursorHint::Pointer => CursorIcon::Pointer,
        CursorHint::Grabbing => CursorIcon::Grabbing,
    }
}

/// Desktop host: one window, one live scene session
pub struct StrikeSceneApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: SceneConfig,
    toggles: DisplayToggles,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    lifecycle: LifecycleManager,
    monitor: PerformanceMonitor,
    started: Instant,
    last_frame: Option<Instant>,
    cursor: (f64, f64),
    fatal: Option<SceneError>,
}

impl StrikeSceneApp {
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        let config = config.sanitized();
        let event_loop = EventLoop::new()?;

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                toggles: config.toggles(),
                lifecycle: LifecycleManager::new(config.variant, config.seed),
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                monitor: PerformanceMonitor::new(),
                started: Instant::now(),
                last_frame: None,
                cursor: (0.0, 0.0),
                fatal: None,
            },
        })
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) -> Result<(), SceneError> {
        let Some(event_loop) = self.event_loop.take() else {
            return Ok(());
        };
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self.app_state)?;

        match self.app_state.fatal.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: SceneError) {
        log::error!("{}", error);
        self.fatal = Some(error);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(render_engine) = self.render_engine.as_mut() {
            self.lifecycle.deactivate(render_engine);
        }
        event_loop.exit();
    }

    fn update_title(&self) {
        if let Some(window) = self.window.as_ref() {
            window.set_title(&format!("{} - {}", self.config.window.title, self.lifecycle.variant().title()));
        }
    }

    fn set_cursor(&self, hint: Option<CursorHint>) {
        if let (Some(window), Some(hint)) = (self.window.as_ref(), hint) {
            window.set_cursor(cursor_icon(hint));
        }
    }

    /// Applies overlay or keyboard commands once the frame is done
    fn apply_commands(&mut self, commands: Vec<UiCommand>) -> Result<(), SceneError> {
        let Some(render_engine) = self.render_engine.as_mut() else {
            return Ok(());
        };

        let mut switched = false;
        for command in commands {
            match command {
                UiCommand::Strike(strike) => {
                    let struck = self.lifecycle.strike(strike);
                    log::debug!("{:?} struck {} object(s)", strike, struck);
                }
                UiCommand::Regenerate => {
                    let count = match self.lifecycle.variant() {
                        SceneVariant::Float => Some(self.toggles.object_count),
                        _ => None,
                    };
                    self.lifecycle.regenerate(count, render_engine)?;
                }
                UiCommand::SwitchVariant(variant) => {
                    self.toggles.light_intensity = self.config.light_intensity_for(variant);
                    self.lifecycle.switch_variant(variant, render_engine, &self.toggles)?;
                    switched = true;
                }
            }
        }
        if switched {
            self.update_title();
        }
        Ok(())
    }

    /// Adopts toggles edited during a frame; a new object count rebuilds the float scene
    fn adopt_toggles(&mut self, edited: DisplayToggles) -> Option<UiCommand> {
        let count_changed = edited.object_count != self.toggles.object_count;
        self.toggles = edited;
        (count_changed && self.lifecycle.variant() == SceneVariant::Float).then_some(UiCommand::Regenerate)
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(render_engine), Some(ui_manager), Some(window)) =
            (self.render_engine.as_mut(), self.ui_manager.as_mut(), self.window.as_ref())
        else {
            return;
        };

        let frame_start = Instant::now();
        if let Some(last) = self.last_frame.replace(frame_start) {
            self.monitor.record_frame(frame_start - last);
        }

        let selected = self.lifecycle.session().and_then(|s| s.pointer.selected());
        let mut presenter = FramePresenter {
            render_engine,
            ui_manager,
            window,
            monitor: &self.monitor,
            variant: self.lifecycle.variant(),
            selected,
            toggles: self.toggles,
            commands: Vec::new(),
            result: Ok(()),
        };

        let now = self.started.elapsed().as_secs_f32();
        self.lifecycle.tick(now, &self.toggles, &mut presenter);

        let FramePresenter {
            toggles,
            mut commands,
            result,
            ..
        } = presenter;

        if let Err(error) = result {
            self.fail(event_loop, error);
            return;
        }
        if let Some(render_engine) = self.render_engine.as_ref() {
            self.monitor.update_render_stats(render_engine.counters());
        }
        commands.extend(self.adopt_toggles(toggles));
        if let Err(error) = self.apply_commands(commands) {
            self.fail(event_loop, error);
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        let PhysicalKey::Code(key_code) = event.physical_key else {
            return;
        };
        let Some(shortcut) = Shortcut::from_key(key_code) else {
            return;
        };
        if shortcut == Shortcut::Exit {
            self.shutdown(event_loop);
            return;
        }

        let mut toggles = self.toggles;
        let mut commands: Vec<UiCommand> = shortcut.apply(&mut toggles).into_iter().collect();
        commands.extend(self.adopt_toggles(toggles));
        if let Err(error) = self.apply_commands(commands) {
            self.fail(event_loop, error);
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(self.config.window.width, self.config.window.height));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, SceneError::Surface(e.to_string()));
                return;
            }
        };
        self.window = Some(window.clone());
        self.update_title();

        let (width, height) = window.inner_size().into();
        let window_clone = window.clone();
        let mut render_engine =
            match pollster::block_on(async move { RenderEngine::new(window_clone, width, height).await }) {
                Ok(engine) => engine,
                Err(e) => {
                    self.fail(event_loop, e);
                    return;
                }
            };

        let ui_manager = UiManager::new(
            render_engine.device(),
            render_engine.queue(),
            render_engine.surface_format(),
            &window,
        );

        let mount = (width > 0 && height > 0).then(|| MountTarget::new(width, height));
        if let Err(e) = self.lifecycle.activate(mount, &mut render_engine, &self.toggles) {
            self.render_engine = Some(render_engine);
            self.fail(event_loop, e);
            return;
        }

        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(render_engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(&window, &ui_event) {
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x, position.y);
                let hint = self.lifecycle.dispatch(HostEvent::PointerMove {
                    x: position.x,
                    y: position.y,
                });
                self.set_cursor(hint);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let event = match state {
                    ElementState::Pressed => HostEvent::PointerDown {
                        x: self.cursor.0,
                        y: self.cursor.1,
                    },
                    ElementState::Released => HostEvent::PointerUp,
                };
                let hint = self.lifecycle.dispatch(event);
                self.set_cursor(hint);
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(width, height);
                }
                if self.lifecycle.is_active() {
                    self.lifecycle.dispatch(HostEvent::Resize { width, height });
                } else if let Some(render_engine) = self.render_engine.as_mut() {
                    // Started minimized: the first real size mounts the scene
                    let mount = (width > 0 && height > 0).then(|| MountTarget::new(width, height));
                    if let Err(e) = self.lifecycle.activate(mount, render_engine, &self.toggles) {
                        self.fail(event_loop, e);
                    }
                }
            }
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // no-op when shutdown() already ran
        if let Some(render_engine) = self.render_engine.as_mut() {
            self.lifecycle.deactivate(render_engine);
        }
    }
}

/// Per-frame sink handed to the frame loop: builds the overlay and presents
struct FramePresenter<'a> {
    render_engine: &'a mut RenderEngine,
    ui_manager: &'a mut UiManager,
    window: &'a Window,
    monitor: &'a PerformanceMonitor,
    variant: SceneVariant,
    selected: Option<ObjectId>,
    toggles: DisplayToggles,
    commands: Vec<UiCommand>,
    result: Result<(), SceneError>,
}

impl FrameSink for FramePresenter<'_> {
    fn draw(&mut self, scene: &Scene) {
        let readout = SelectionReadout::from_scene(scene, self.selected);
        let object_total = scene.objects.len();
        let (variant, monitor) = (self.variant, self.monitor);
        let (toggles, commands) = (&mut self.toggles, &mut self.commands);

        self.ui_manager.update_logic(self.window, |ui| {
            if toggles.show_stats {
                monitor.render_overlay(ui);
            }
            control_panel(ui, variant, object_total, toggles, readout.as_ref(), commands);
        });

        let ui_manager = &mut *self.ui_manager;
        self.result = self.render_engine.render_frame(
            scene,
            Some(|device: &wgpu::Device, queue: &wgpu::Queue, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView| {
                ui_manager.render_display_only(device, queue, encoder, view);
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderMode;

    #[test]
    fn test_digit_keys_strike_by_index() {
        assert_eq!(Shortcut::from_key(KeyCode::Digit1), Some(Shortcut::StrikeIndex(0)));
        assert_eq!(Shortcut::from_key(KeyCode::Digit9), Some(Shortcut::StrikeIndex(8)));
        assert_eq!(Shortcut::from_key(KeyCode::Digit0), None);
        assert_eq!(Shortcut::from_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn test_toggle_shortcuts_edit_toggles_only() {
        let mut toggles = DisplayToggles::default();
        assert_eq!(Shortcut::ToggleWireframe.apply(&mut toggles), None);
        assert_eq!(toggles.render_mode, RenderMode::Wireframe);

        let stats = toggles.show_stats;
        Shortcut::ToggleStats.apply(&mut toggles);
        assert_eq!(toggles.show_stats, !stats);

        let auto_strike = toggles.auto_strike;
        Shortcut::ToggleAutoStrike.apply(&mut toggles);
        assert_eq!(toggles.auto_strike, !auto_strike);
    }

    #[test]
    fn test_action_shortcuts_become_commands() {
        let mut toggles = DisplayToggles::default();
        let before = toggles;
        assert_eq!(
            Shortcut::StrikeAll.apply(&mut toggles),
            Some(UiCommand::Strike(StrikeCommand::All))
        );
        assert_eq!(
            Shortcut::StrikeIndex(2).apply(&mut toggles),
            Some(UiCommand::Strike(StrikeCommand::Index(2)))
        );
        assert_eq!(Shortcut::Regenerate.apply(&mut toggles), Some(UiCommand::Regenerate));
        assert_eq!(toggles, before);
    }

    #[test]
    fn test_cursor_icons() {
        assert_eq!(cursor_icon(CursorHint::Pointer), CursorIcon::Pointer);
        assert_eq!(cursor_icon(CursorHint::Default), CursorIcon::Default);
        assert_eq!(cursor_icon(CursorHint::Grabbing), CursorIcon::Grabbing);
    }
}

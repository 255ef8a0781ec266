use anyhow::{Context, Result};
use clap::Parser;
use desk_scene::{Config, State};
use winit::{
    dpi::LogicalSize,
    event::*,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, WindowBuilder},
};

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::parse();

    let event_loop = winit::event_loop::EventLoop::new().context("Failed to create event loop")?;

    let window = WindowBuilder::new()
        .with_title("Desk Scene")
        .with_inner_size(LogicalSize::new(config.width, config.height))
        .build(&event_loop)
        .context("Failed to create window")?;

    let mut state = State::new(window, &config)?;
    let mut mouse_captured = false;

    event_loop.run(move |event, window_target| {
        match event {
            Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                match event {
                    WindowEvent::KeyboardInput {
                        event: KeyEvent {
                            physical_key: PhysicalKey::Code(key_code),
                            state: key_state,
                            ..
                        },
                        ..
                    } => {
                        let pressed = key_state == ElementState::Pressed;
                        match key_code {
                            KeyCode::Escape => {
                                if pressed {
                                    mouse_captured = false;
                                    if let Err(e) = state.window().set_cursor_grab(CursorGrabMode::None) {
                                        log::warn!("Failed to release cursor: {}", e);
                                    }
                                    state.window().set_cursor_visible(true);
                                }
                            }
                            _ => state.process_keyboard(key_code, pressed),
                        }
                    }
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        button: MouseButton::Left,
                        ..
                    } => {
                        let grab = state.window().set_cursor_grab(CursorGrabMode::Confined)
                            .or_else(|_| state.window().set_cursor_grab(CursorGrabMode::Locked));
                        match grab {
                            Ok(()) => {
                                mouse_captured = true;
                                state.window().set_cursor_visible(false);
                            }
                            Err(e) => log::warn!("Failed to capture cursor: {}", e),
                        }
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let lines = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y,
                            MouseScrollDelta::PixelDelta(pos) => (pos.y / 20.0) as f32,
                        };
                        state.process_scroll(lines);
                    }
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        state.resize(new_size);
                    }
                    WindowEvent::RedrawRequested => {
                        if let Err(e) = state.render() {
                            log::error!("{:#}", e);
                            window_target.exit();
                        }
                    }
                    _ => {}
                }
            }
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } if mouse_captured => {
                state.process_mouse(delta.0 as f32, delta.1 as f32);
            }
            Event::AboutToWait => {
                state.update();
                state.window().request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}

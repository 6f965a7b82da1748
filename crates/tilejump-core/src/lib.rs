pub mod audio;
pub mod draw;
pub mod geom;
pub mod health;
pub mod timer;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::cell::{Cell, RefCell};

    use crate::audio::{AudioError, AudioSink, SoundKey};
    use crate::draw::{Color, Surface};
    use crate::geom::Rect;

    /// Audio sink that records every cue it is asked to play.
    ///
    /// With `failing` set, each call is still recorded but returns an error,
    /// which lets tests check that audio failures never leak into state.
    #[derive(Debug, Default)]
    pub struct RecordingAudio {
        pub played: RefCell<Vec<SoundKey>>,
        pub failing: Cell<bool>,
    }

    impl RecordingAudio {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            let sink = Self::default();
            sink.failing.set(true);
            sink
        }

        pub fn count(&self, key: SoundKey) -> usize {
            self.played.borrow().iter().filter(|k| **k == key).count()
        }
    }

    impl AudioSink for RecordingAudio {
        fn play(&self, key: SoundKey) -> Result<(), AudioError> {
            self.played.borrow_mut().push(key);
            if self.failing.get() {
                return Err(AudioError::Unavailable("test mixer disabled".into()));
            }
            Ok(())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCall {
        Blit { sprite: String, dest: Rect, flip_x: bool },
        Outline { rect: Rect, color: Color },
    }

    /// Surface that records draw calls in order.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub calls: Vec<DrawCall>,
    }

    impl RecordingSurface {
        pub fn new() -> Self {
            Self::default()
        }

        /// Sprite names of all blits, in draw order.
        pub fn sprites(&self) -> Vec<&str> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    DrawCall::Blit { sprite, .. } => Some(sprite.as_str()),
                    DrawCall::Outline { .. } => None,
                })
                .collect()
        }
    }

    impl Surface for RecordingSurface {
        fn blit(&mut self, sprite: &str, dest: Rect, flip_x: bool) {
            self.calls.push(DrawCall::Blit {
                sprite: sprite.to_string(),
                dest,
                flip_x,
            });
        }

        fn outline(&mut self, rect: Rect, color: Color) {
            self.calls.push(DrawCall::Outline { rect, color });
        }
    }

    /// Assert two floats are within `tol` of each other.
    #[track_caller]
    pub fn assert_near(actual: f32, expected: f32, tol: f32) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected} ± {tol}, got {actual}"
        );
    }
}

use thiserror::Error;

/// Fatal configuration errors raised at construction time.
///
/// Everything else in the crate is a tolerant no-op or an observable clamp;
/// only genuinely impossible configurations surface as errors.
#[derive(Debug, Error)]
pub enum UiError {
    #[error("shape theming is missing the required `normal` state")]
    MissingNormalState,

    #[error("window content area would be degenerate: {width}x{height}")]
    DegenerateWindowRect { width: f32, height: f32 },
}

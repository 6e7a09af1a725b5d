//! Terminal output: styled status lines and Markdown rendering

mod output;
mod render;

pub use output::{Output, styled_status, styled_tier};
pub use render::{render_document, render_verification, render_view};

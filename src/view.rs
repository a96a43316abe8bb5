//! View helpers for UI shells.
//!
//! [`WorkflowView`] is everything a shell needs to draw the converter:
//! which buttons are enabled, the preview URI, and a failure message. It is
//! derived from [`WorkflowState`] and holds no state of its own.
//!
//! [`ButtonStyle`] is the presentation side of the two action buttons:
//! a variant and a size mapped to CSS utility classes.

use crate::format::TargetFormat;
use crate::workflow::WorkflowState;
use serde::{Deserialize, Serialize};

/// Render-ready snapshot of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowView {
    /// Name of the selected file, if any.
    pub source_name: Option<String>,
    pub target_format: TargetFormat,
    /// Enabled when a file is selected and no conversion is running.
    pub convert_enabled: bool,
    /// Enabled when an artifact exists.
    pub download_enabled: bool,
    pub converting: bool,
    /// Data URI of the artifact, for an `<img>` or texture upload.
    pub preview: Option<String>,
    /// Format the preview is actually in; may differ from `target_format`.
    pub preview_format: Option<TargetFormat>,
    /// Message for the last failed conversion.
    pub error: Option<String>,
}

impl WorkflowView {
    pub fn new(state: &WorkflowState, converting: bool) -> Self {
        let artifact = state.artifact();
        Self {
            source_name: state.source().map(|s| s.name().to_string()),
            target_format: state.target_format(),
            convert_enabled: state.source().is_some() && !converting,
            download_enabled: artifact.is_some(),
            converting,
            preview: artifact.map(|a| a.data_uri()),
            preview_format: artifact.map(|a| a.format),
            error: state.last_failure().map(|f| f.to_string()),
        }
    }

    /// The preview is out of date with the selected target format.
    pub fn is_stale(&self) -> bool {
        self.preview_format
            .is_some_and(|f| f != self.target_format)
    }
}

/// Visual variant of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    #[default]
    Default,
    Outline,
    Subtle,
}

/// Button size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonSize {
    Sm,
    #[default]
    Md,
    Lg,
}

/// Variant + size, rendered as a class list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ButtonStyle {
    pub variant: ButtonVariant,
    pub size: ButtonSize,
}

const BUTTON_BASE: &str = "inline-flex items-center justify-center rounded-md font-medium \
transition-colors disabled:opacity-50 disabled:pointer-events-none";

impl ButtonStyle {
    pub fn new(variant: ButtonVariant, size: ButtonSize) -> Self {
        Self { variant, size }
    }

    /// Full class list: base, variant, size.
    pub fn class_names(&self) -> String {
        let variant = match self.variant {
            ButtonVariant::Default => "bg-slate-900 text-white hover:bg-slate-700",
            ButtonVariant::Outline => "bg-transparent border border-slate-200 hover:bg-slate-100",
            ButtonVariant::Subtle => "bg-slate-100 text-slate-900 hover:bg-slate-200",
        };
        let size = match self.size {
            ButtonSize::Sm => "h-9 px-2 text-sm",
            ButtonSize::Md => "h-10 py-2 px-4",
            ButtonSize::Lg => "h-11 px-8 text-lg",
        };
        format!("{BUTTON_BASE} {variant} {size}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkflowFailure;
    use crate::output::ConvertedArtifact;
    use crate::source::SourceFile;

    fn artifact(format: TargetFormat) -> ConvertedArtifact {
        ConvertedArtifact {
            format,
            width: 1,
            height: 1,
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn empty_state_disables_everything() {
        let v = WorkflowView::new(&WorkflowState::default(), false);
        assert!(!v.convert_enabled);
        assert!(!v.download_enabled);
        assert!(v.preview.is_none());
        assert!(!v.is_stale());
    }

    #[test]
    fn convert_disabled_while_converting() {
        let mut s = WorkflowState::default();
        s.select_file(SourceFile::from_bytes("a.png", vec![0u8]));
        assert!(WorkflowView::new(&s, false).convert_enabled);
        assert!(!WorkflowView::new(&s, true).convert_enabled);
    }

    #[test]
    fn stale_preview_after_format_change() {
        let mut s = WorkflowState::new(TargetFormat::Png);
        s.select_file(SourceFile::from_bytes("a.png", vec![0u8]));
        s.publish(artifact(TargetFormat::Png), s.source_generation());
        s.select_target_format(TargetFormat::Jpeg);

        let v = WorkflowView::new(&s, false);
        assert!(v.download_enabled);
        assert_eq!(v.preview_format, Some(TargetFormat::Png));
        assert!(v.is_stale());
        assert!(v
            .preview
            .as_deref()
            .is_some_and(|uri| uri.starts_with("data:image/png;base64,")));
    }

    #[test]
    fn failure_is_surfaced() {
        let mut s = WorkflowState::default();
        s.select_file(SourceFile::from_bytes("a.png", vec![0u8]));
        s.record_failure(
            WorkflowFailure::Decode {
                detail: "truncated".into(),
            },
            s.source_generation(),
        );
        let v = WorkflowView::new(&s, false);
        assert!(v.error.unwrap().contains("truncated"));
    }

    #[test]
    fn button_classes_combine_variant_and_size() {
        let classes = ButtonStyle::new(ButtonVariant::Outline, ButtonSize::Lg).class_names();
        assert!(classes.starts_with("inline-flex"));
        assert!(classes.contains("border"));
        assert!(classes.ends_with("text-lg"));

        let default = ButtonStyle::default().class_names();
        assert!(default.contains("bg-slate-900"));
        assert!(default.contains("h-10"));
    }
}

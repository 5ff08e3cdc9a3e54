//! Swipe actions offered on tool rows.

use toolkit_model::DisplayRow;

/// An action a user can take on a tool row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolAction {
    /// Export or share the tool's first attachment.
    Export,
    /// Attach a personal note to the tool.
    AddNote,
    /// Mark the tool as critical for this user.
    MarkCritical,
}

impl ToolAction {
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Export => "EXPORT OR SHARE",
            Self::AddNote => "ADD NOTE",
            Self::MarkCritical => "MARK AS CRITICAL TOOL",
        }
    }
}

/// Actions available on `row`, in display order. Only tools have any.
///
/// Tools the content source already flagged critical cannot be re-marked, and
/// tools without a `critical_path` flag at all are not offered the option.
pub fn actions_for(row: &DisplayRow) -> Vec<ToolAction> {
    let DisplayRow::Tool(tool) = row else {
        return Vec::new();
    };

    let mut actions = Vec::with_capacity(3);
    if tool.first_attachment().and_then(|file| file.url()).is_some() {
        actions.push(ToolAction::Export);
    }
    actions.push(ToolAction::AddNote);
    if tool.critical_flag() == Some(false) {
        actions.push(ToolAction::MarkCritical);
    }
    actions
}

use crate::layout::Layout;
use crate::types::InstanceId;

/// Answers "is this instance running right now" from its marker file.
///
/// Nothing is cached: every call looks at the filesystem.
pub struct LivenessChecker {
    layout: Layout,
}

impl LivenessChecker {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn is_alive(&self, id: &InstanceId) -> bool {
        self.layout.marker_path(id).is_file()
    }
}

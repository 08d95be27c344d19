//! The closed set of actions the data API accepts.

use std::fmt;

/// One data API action. The wire name doubles as the last URL path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    #[default]
    Find,
    FindOne,
    InsertOne,
    UpdateOne,
    UpdateMany,
    DeleteOne,
    DeleteMany,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Action; 7] = [
        Action::Find,
        Action::FindOne,
        Action::InsertOne,
        Action::UpdateOne,
        Action::UpdateMany,
        Action::DeleteOne,
        Action::DeleteMany,
    ];

    /// Returns the wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Find => "find",
            Action::FindOne => "findOne",
            Action::InsertOne => "insertOne",
            Action::UpdateOne => "updateOne",
            Action::UpdateMany => "updateMany",
            Action::DeleteOne => "deleteOne",
            Action::DeleteMany => "deleteMany",
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self, Action::UpdateOne | Action::UpdateMany)
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Action::DeleteOne | Action::DeleteMany)
    }

    /// Whether the action is refused when its filter is empty.
    pub fn requires_filter(&self) -> bool {
        self.is_update() || self.is_delete()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

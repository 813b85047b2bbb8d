use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Failure,
    Warning,
}

/// Non-blocking toast shown by the front-end. Drained on every snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct NoticeQueue {
    pending: Vec<Notice>,
}

impl NoticeQueue {
    pub fn push(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.pending.push(Notice {
            kind,
            message: message.into(),
        });
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending)
    }

    #[cfg(test)]
    pub fn peek(&self) -> &[Notice] {
        &self.pending
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerState {
    Idle,
    Composing { target: String, buffer: String },
    Submitting { target: String, buffer: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerError {
    /// The action needs an open composer.
    NotComposing,
    /// Input is locked while a submission is in flight.
    Busy,
    /// A note is already being composed for another record.
    AlreadyOpen,
}

impl ComposerError {
    pub fn message(self) -> &'static str {
        match self {
            Self::NotComposing => "no note is being composed",
            Self::Busy => "a note submission is already in progress",
            Self::AlreadyOpen => "close the open note before starting another",
        }
    }
}

/// What a submission sends to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub target: String,
    pub text: String,
}

pub enum SubmitStart {
    Empty,
    Ready(Submission),
}

/// The "Add Note" modal. The target record is fixed while the modal is
/// open; the buffer survives a failed submission so it can be retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteComposer {
    state: ComposerState,
}

impl Default for NoteComposer {
    fn default() -> Self {
        Self {
            state: ComposerState::Idle,
        }
    }
}

impl NoteComposer {
    #[cfg(test)]
    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    pub fn open(&mut self, target: &str) -> Result<(), ComposerError> {
        match &self.state {
            ComposerState::Idle => {}
            ComposerState::Composing { target: open, .. } if open == target => return Ok(()),
            ComposerState::Composing { .. } => return Err(ComposerError::AlreadyOpen),
            ComposerState::Submitting { .. } => return Err(ComposerError::Busy),
        }
        self.state = ComposerState::Composing {
            target: target.to_string(),
            buffer: String::new(),
        };
        Ok(())
    }

    pub fn edit(&mut self, text: &str) -> Result<(), ComposerError> {
        match &mut self.state {
            ComposerState::Composing { buffer, .. } => {
                *buffer = text.to_string();
                Ok(())
            }
            ComposerState::Submitting { .. } => Err(ComposerError::Busy),
            ComposerState::Idle => Err(ComposerError::NotComposing),
        }
    }

    pub fn cancel(&mut self) -> Result<(), ComposerError> {
        match self.state {
            ComposerState::Composing { .. } => {
                self.state = ComposerState::Idle;
                Ok(())
            }
            ComposerState::Submitting { .. } => Err(ComposerError::Busy),
            ComposerState::Idle => Err(ComposerError::NotComposing),
        }
    }

    /// Moves to `Submitting` when the buffer has content. A blank buffer
    /// leaves the composer open and reports `Empty`.
    pub fn begin_submit(&mut self) -> Result<SubmitStart, ComposerError> {
        let (target, buffer) = match &self.state {
            ComposerState::Composing { target, buffer } => (target.clone(), buffer.clone()),
            ComposerState::Submitting { .. } => return Err(ComposerError::Busy),
            ComposerState::Idle => return Err(ComposerError::NotComposing),
        };
        let text = buffer.trim().to_string();
        if text.is_empty() {
            return Ok(SubmitStart::Empty);
        }
        self.state = ComposerState::Submitting {
            target: target.clone(),
            buffer,
        };
        Ok(SubmitStart::Ready(Submission { target, text }))
    }

    /// Resolves an in-flight submission. Success closes the composer and
    /// clears the buffer; failure reopens it with the buffer intact.
    pub fn finish_submit(&mut self, accepted: bool) -> Result<(), ComposerError> {
        let ComposerState::Submitting { target, buffer } = &self.state else {
            return Err(ComposerError::NotComposing);
        };
        self.state = if accepted {
            ComposerState::Idle
        } else {
            ComposerState::Composing {
                target: target.clone(),
                buffer: buffer.clone(),
            }
        };
        Ok(())
    }

    pub fn view(&self) -> ComposerView<'_> {
        match &self.state {
            ComposerState::Idle => ComposerView {
                state: "idle",
                target_id: None,
                buffer: None,
            },
            ComposerState::Composing { target, buffer } => ComposerView {
                state: "composing",
                target_id: Some(target),
                buffer: Some(buffer),
            },
            ComposerState::Submitting { target, buffer } => ComposerView {
                state: "submitting",
                target_id: Some(target),
                buffer: Some(buffer),
            },
        }
    }
}

#[derive(Debug)]
pub struct ComposerView<'a> {
    pub state: &'static str,
    pub target_id: Option<&'a str>,
    pub buffer: Option<&'a str>,
}

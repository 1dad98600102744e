use std::collections::VecDeque;

use async_trait::async_trait;

use super::LineSource;
use super::SourceError;

/// Replays a fixed list of lines, then reports end of stream
#[derive(Debug, Default, Clone)]
pub struct ScriptedSource {
    lines: VecDeque<String>,
    shut_down: bool,
}

impl ScriptedSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            shut_down: false,
        }
    }

    /// Lines not yet consumed
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

#[async_trait]
impl LineSource for ScriptedSource {
    async fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        if self.shut_down {
            return Ok(None);
        }
        Ok(self.lines.pop_front())
    }

    async fn shutdown(&mut self) -> Result<(), SourceError> {
        self.shut_down = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order() {
        let mut source = ScriptedSource::new(["one", "two"]);

        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("one"));
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("two"));
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_shutdown_ends_stream() {
        let mut source = ScriptedSource::new(vec!["one".to_string()]);
        source.shutdown().await.unwrap();

        assert!(source.is_shut_down());
        assert_eq!(source.next_line().await.unwrap(), None);
    }
}

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Lifetime of one view. Whatever runs in it is abandoned once the scope is
/// cancelled or dropped.
#[derive(Debug, Default)]
pub struct Scoped {
    token: CancellationToken,
}

impl Scoped {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope that also ends when `parent` is cancelled.
    pub fn child_of(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Output of `fut`, or `None` if the scope ends first.
    pub async fn run<F>(&self, fut: F) -> Option<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            out = fut => Some(out),
        }
    }
}

impl Drop for Scoped {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

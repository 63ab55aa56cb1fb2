use futures::future::BoxFuture;
use image::DynamicImage;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;

use crate::analysis::Analyzer;
use crate::common::DescribedImage;
use crate::error::AnalyzeError;

/// Requests a host can route to the analyzer.
pub enum AnalyzeRequest {
    Analyze { user: String, image: DynamicImage },
    Refresh { user: String },
}

#[derive(Debug)]
pub enum AnalyzeResponse {
    Described(DescribedImage),
    Refreshed,
}

/// `tower::Service` front for a shared [`Analyzer`], so hosts can stack
/// their own layers (timeouts, concurrency limits) around it.
#[derive(Clone)]
pub struct AnalyzeService {
    analyzer: Arc<Analyzer>,
}

impl AnalyzeService {
    pub fn new(analyzer: Arc<Analyzer>) -> Self {
        Self { analyzer }
    }
}

impl Service<AnalyzeRequest> for AnalyzeService {
    type Response = AnalyzeResponse;
    type Error = AnalyzeError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: AnalyzeRequest) -> Self::Future {
        let analyzer = self.analyzer.clone();
        Box::pin(async move {
            match req {
                AnalyzeRequest::Analyze { user, image } => analyzer
                    .analyze(&user, image)
                    .await
                    .map(AnalyzeResponse::Described),
                AnalyzeRequest::Refresh { user } => {
                    analyzer.refresh(&user);
                    Ok(AnalyzeResponse::Refreshed)
                }
            }
        })
    }
}

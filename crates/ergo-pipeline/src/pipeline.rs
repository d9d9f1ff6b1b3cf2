//! Sequential frame-scoring pipeline.
//!
//! Drives a frame source through adaptation, scoring and classification and
//! appends one record per frame to a [`RecordSink`], in input order.

use ergo_core::{PoseFrame, Result};
use ergo_rula::{RiskAssessment, RiskScorer};

use crate::adapter::LandmarkAdapter;
use crate::sink::{RecordSink, ResultRecord};
use crate::source::RawFrame;
use crate::summary::RunSummary;

type AssessmentCallback = Box<dyn Fn(&RiskAssessment)>;

/// The main scoring pipeline
pub struct Pipeline<K: RecordSink> {
    adapter: LandmarkAdapter,
    scorer: RiskScorer,
    sink: K,
    callbacks: Vec<AssessmentCallback>,
}

impl<K: RecordSink> Pipeline<K> {
    pub fn new(adapter: LandmarkAdapter, scorer: RiskScorer, sink: K) -> Self {
        Self {
            adapter,
            scorer,
            sink,
            callbacks: Vec::new(),
        }
    }

    /// Add a callback invoked for every assessment before it is persisted
    pub fn on_assessment<F>(&mut self, callback: F)
    where
        F: Fn(&RiskAssessment) + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Canonical frame for the unit at sequence position `index`
    pub fn adapt(&self, index: u64, raw: RawFrame) -> PoseFrame {
        match raw {
            RawFrame::Canonical(frame) if frame.index() == index => frame,
            RawFrame::Canonical(frame) => PoseFrame::from_landmarks(
                index,
                frame.present().map(|(joint, lm)| (joint, *lm)),
            ),
            RawFrame::Detector(detected) => self.adapter.from_detector(index, &detected),
            RawFrame::Tabular(row) => self.adapter.from_row(index, &row),
        }
    }

    /// Score one raw frame without persisting it
    pub fn process(&self, index: u64, raw: RawFrame) -> RiskAssessment {
        self.scorer.assess(&self.adapt(index, raw))
    }

    /// Consume `source` to exhaustion.
    ///
    /// Frame-local errors are logged and skipped; their sequence position
    /// produces no record. Any other error, including a failed append, stops
    /// the run and is returned.
    pub fn run<S>(&mut self, source: S) -> Result<RunSummary>
    where
        S: IntoIterator<Item = Result<RawFrame>>,
    {
        let mut summary = RunSummary::default();

        for (position, item) in source.into_iter().enumerate() {
            let index = position as u64;
            let raw = match item {
                Ok(raw) => raw,
                Err(e) if e.is_frame_local() => {
                    tracing::warn!(frame = index, error = %e, "skipping malformed frame");
                    summary.record_skip();
                    continue;
                }
                Err(e) => return Err(e),
            };

            let assessment = self.process(index, raw);
            for callback in &self.callbacks {
                callback(&assessment);
            }

            self.sink.append(&ResultRecord::from(&assessment))?;
            summary.record(&assessment);
        }

        self.sink.finish()?;

        tracing::info!(
            scored = summary.frames_scored,
            skipped = summary.frames_skipped,
            mean_score = summary.mean_score,
            "pipeline run complete"
        );
        Ok(summary)
    }

    pub fn scorer(&self) -> &RiskScorer {
        &self.scorer
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }
}

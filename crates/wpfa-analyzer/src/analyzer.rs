//! Whole-compilation driver.
//!
//! `Analyzer` plays the host's part for a complete `SemanticModel`: it walks each
//! source unit in pre-order, hands every node to the rules registered for its
//! `SyntaxKind`, and collects the results in a `DiagnosticSink`. Source units run
//! on the rayon pool unless `parallel` is switched off.

use crate::context::AnalysisContext;
use crate::options::AnalyzerOptions;
use crate::rules::{RuleBox, all_rules};
use crate::sink::DiagnosticSink;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};
use wpfa_common::limits::CANCELLATION_CHECK_INTERVAL;
use wpfa_common::{CancellationToken, Cancelled, Diagnostic};
use wpfa_syntax::{NodeIndex, SemanticModel, SourceFile, SyntaxKind};

/// Outcome of one pass over a compilation.
#[derive(Clone, Debug, Default)]
pub struct AnalysisResult {
    /// Diagnostics ordered by source unit, then by report order. Empty when cancelled.
    pub diagnostics: Vec<Diagnostic>,
    pub cancelled: bool,
    pub files_analyzed: usize,
    /// Generated source units left out.
    pub files_skipped: usize,
}

pub struct Analyzer {
    rules: Vec<RuleBox>,
    /// Rule indices per node kind, in registration order.
    dispatch: FxHashMap<SyntaxKind, SmallVec<[usize; 2]>>,
    options: AnalyzerOptions,
}

impl Analyzer {
    /// Analyzer running every built-in rule.
    pub fn new(options: AnalyzerOptions) -> Self {
        Self::with_rules(all_rules(), options)
    }

    /// Analyzer running `rules`. Rules whose codes are all disabled are dropped.
    pub fn with_rules(rules: Vec<RuleBox>, options: AnalyzerOptions) -> Self {
        let rules: Vec<RuleBox> = rules
            .into_iter()
            .filter(|rule| {
                let enabled = rule.codes().iter().any(|code| options.is_rule_enabled(code));
                if !enabled {
                    debug!(rule = rule.name(), "rule disabled");
                }
                enabled
            })
            .collect();
        let mut dispatch: FxHashMap<SyntaxKind, SmallVec<[usize; 2]>> = FxHashMap::default();
        for (index, rule) in rules.iter().enumerate() {
            for kind in rule.triggers() {
                dispatch.entry(*kind).or_default().push(index);
            }
        }
        Self {
            rules,
            dispatch,
            options,
        }
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    pub fn rules(&self) -> &[RuleBox] {
        &self.rules
    }

    /// Analyze every source unit of `model`.
    ///
    /// Cancellation is not an error: the result comes back with `cancelled` set and
    /// no diagnostics.
    #[tracing::instrument(level = "debug", skip_all, fields(files = model.files().len()))]
    pub fn analyze(
        &self,
        model: &dyn SemanticModel,
        cancellation: &CancellationToken,
    ) -> AnalysisResult {
        let ctx = AnalysisContext::new(model, cancellation);
        let (files, skipped): (Vec<&SourceFile>, Vec<&SourceFile>) = model
            .files()
            .iter()
            .partition(|file| self.should_analyze(file));
        for file in &skipped {
            trace!(path = %file.path, "skipping generated source unit");
        }

        let sink = DiagnosticSink::new();
        let run = |file: &&SourceFile| match self.analyze_file(&ctx, file) {
            Ok(diagnostics) => {
                sink.extend(file.id, diagnostics);
                true
            }
            Err(Cancelled) => false,
        };
        let completed: Vec<bool> = if self.options.parallel() {
            files.par_iter().map(run).collect()
        } else {
            files.iter().map(run).collect()
        };

        if completed.contains(&false) || cancellation.is_cancelled() {
            debug!("analysis cancelled");
            return AnalysisResult {
                diagnostics: Vec::new(),
                cancelled: true,
                files_analyzed: completed.iter().filter(|done| **done).count(),
                files_skipped: skipped.len(),
            };
        }

        let diagnostics = sink.drain();
        debug!(
            diagnostics = diagnostics.len(),
            files = files.len(),
            skipped = skipped.len(),
            "analysis finished"
        );
        AnalysisResult {
            diagnostics,
            cancelled: false,
            files_analyzed: files.len(),
            files_skipped: skipped.len(),
        }
    }

    /// Run the rules over one source unit, in pre-order.
    pub fn analyze_file(
        &self,
        ctx: &AnalysisContext<'_>,
        file: &SourceFile,
    ) -> Result<Vec<Diagnostic>, Cancelled> {
        trace!(path = %file.path, "analyzing source unit");
        let mut diagnostics = Vec::new();
        for (visited, node) in ctx.descendants(file.root).into_iter().enumerate() {
            if visited % CANCELLATION_CHECK_INTERVAL == 0 {
                ctx.check_cancelled()?;
            }
            diagnostics.extend(self.analyze_node(ctx, node)?);
        }
        Ok(diagnostics)
    }

    /// Run the rules registered for `node`'s kind.
    pub fn analyze_node(
        &self,
        ctx: &AnalysisContext<'_>,
        node: NodeIndex,
    ) -> Result<Vec<Diagnostic>, Cancelled> {
        let Some(kind) = ctx.kind(node) else {
            return Ok(Vec::new());
        };
        let Some(indices) = self.dispatch.get(&kind) else {
            return Ok(Vec::new());
        };
        let mut diagnostics = Vec::new();
        for &index in indices {
            ctx.check_cancelled()?;
            let rule = &self.rules[index];
            if let Some(diagnostic) = rule.check(ctx, node)?
                && self.options.is_rule_enabled(diagnostic.code)
            {
                trace!(rule = rule.name(), code = diagnostic.code, "rule reported");
                diagnostics.push(diagnostic);
            }
        }
        Ok(diagnostics)
    }

    fn should_analyze(&self, file: &SourceFile) -> bool {
        self.options.analyze_generated_code()
            || !(file.is_generated || AnalyzerOptions::is_generated_path(&file.path))
    }
}

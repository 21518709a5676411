//! Drives fetch, chunking, extraction, deduplication and persistence for one run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ptracker_domain::{EntityKind, chunking};

use crate::{
	ActionExtractor, AnalysisContext, DraftEntity, EntityExtractor, PromiseExtractor, Result,
};

#[derive(Clone, Copy, Debug)]
pub struct CandidateRef<'a> {
	pub candidate_id: Uuid,
	pub name: &'a str,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
	pub urls_total: usize,
	pub urls_failed: usize,
	pub kinds: Vec<KindReport>,
}
impl AnalysisReport {
	pub fn kind(&self, kind: EntityKind) -> Option<&KindReport> {
		self.kinds.iter().find(|report| report.kind == kind)
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindReport {
	pub kind: EntityKind,
	/// Drafts that passed the verbatim guard.
	pub extracted: usize,
	/// Drafts left after clustering and the stored-claim match.
	pub kept: usize,
	pub persisted: usize,
	pub persisted_ids: Vec<Uuid>,
}

/// Extractor registry. Extractors run in registration order.
pub struct SourceAnalyzer {
	extractors: Vec<Box<dyn EntityExtractor>>,
}
impl SourceAnalyzer {
	pub fn empty() -> Self {
		Self { extractors: Vec::new() }
	}

	/// Adds `extractor`, replacing any earlier one for the same kind in place.
	pub fn register(mut self, extractor: Box<dyn EntityExtractor>) -> Self {
		let kind = extractor.kind();

		match self.extractors.iter().position(|existing| existing.kind() == kind) {
			Some(idx) => self.extractors[idx] = extractor,
			None => self.extractors.push(extractor),
		}

		self
	}

	pub fn get(&self, kind: EntityKind) -> Option<&dyn EntityExtractor> {
		self.extractors.iter().find(|extractor| extractor.kind() == kind).map(|e| e.as_ref())
	}

	pub fn kinds(&self) -> Vec<EntityKind> {
		self.extractors.iter().map(|extractor| extractor.kind()).collect()
	}

	pub async fn analyze_sources(
		&self,
		ctx: &AnalysisContext<'_>,
		candidate: CandidateRef<'_>,
		urls: &[String],
	) -> Result<AnalysisReport> {
		let mut report = AnalysisReport { urls_total: urls.len(), ..Default::default() };
		let mut drafts: Vec<Vec<DraftEntity>> =
			self.extractors.iter().map(|_| Vec::new()).collect();

		for url in urls {
			let text = match ctx.providers.fetcher.fetch(&ctx.cfg.fetch, url).await {
				Ok(text) => text,
				Err(err) => {
					tracing::warn!(
						url = %url,
						error = %err,
						"Failed to fetch source. Skipping it."
					);

					report.urls_failed += 1;

					continue;
				},
			};

			for chunk in chunking::chunks(&text, ctx.cfg.pipeline.extract_length) {
				for (slot, extractor) in self.extractors.iter().enumerate() {
					match extractor.extract(ctx, chunk.text, candidate.name, url).await {
						Ok(found) => drafts[slot].extend(found),
						Err(err) => {
							tracing::warn!(
								url = %url,
								chunk_index = chunk.index,
								kind = %extractor.kind(),
								error = %err,
								"Extraction failed. Skipping chunk."
							);
						},
					}
				}
			}
		}

		for (extractor, found) in self.extractors.iter().zip(drafts) {
			let kind = extractor.kind();
			let extracted = found.len();

			tracing::info!(
				kind = %kind,
				candidate_id = %candidate.candidate_id,
				drafts = extracted,
				"Drafts before deduplication."
			);

			let kept = extractor.deduplicate(ctx, candidate.candidate_id, found).await?;

			tracing::info!(
				kind = %kind,
				candidate_id = %candidate.candidate_id,
				drafts = kept.len(),
				"Drafts after deduplication."
			);

			let kept_count = kept.len();
			let persisted_ids = extractor.persist(ctx, candidate.candidate_id, kept).await?;

			report.kinds.push(KindReport {
				kind,
				extracted,
				kept: kept_count,
				persisted: persisted_ids.len(),
				persisted_ids,
			});
		}

		Ok(report)
	}
}
impl Default for SourceAnalyzer {
	fn default() -> Self {
		Self::empty()
			.register(Box::new(PromiseExtractor))
			.register(Box::new(ActionExtractor))
	}
}

//! Service layer for HIT lifecycle orchestration.

use super::{HitSyncError, HitSyncResult, SyncConfig};
use crate::hit::{
    domain::{
        Hit, HitDisposalError, HitDomainError, HitDraft, HitExtension, HitId, HitStatus,
        RemoteHit, RemoteHitId,
    },
    ports::{HitRepository, MarketplaceClient},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Whether a HIT refresh also refreshes its assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentCascade {
    /// Refresh only the HIT.
    Skip,
    /// Refresh the HIT, then every page of its assignments.
    Refresh,
}

/// Paging parameters for an assignment refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentPaging {
    /// First page to fetch, starting at 1.
    pub start_page: u32,
    /// Assignments requested per page.
    pub page_size: u32,
    /// Keep fetching until every result has been seen.
    pub follow_pages: bool,
}

impl AssignmentPaging {
    /// Starts at page 1 and follows every page.
    #[must_use]
    pub const fn new(page_size: u32) -> Self {
        Self {
            start_page: 1,
            page_size,
            follow_pages: true,
        }
    }

    /// Starts at the given page.
    #[must_use]
    pub const fn starting_at(mut self, page: u32) -> Self {
        self.start_page = page;
        self
    }

    /// Fetches only the first requested page.
    #[must_use]
    pub const fn single_page(mut self) -> Self {
        self.follow_pages = false;
        self
    }

    const fn validate(self) -> Result<Self, HitDomainError> {
        if self.start_page == 0 || self.page_size == 0 {
            return Err(HitDomainError::InvalidPaging {
                page: self.start_page,
                page_size: self.page_size,
            });
        }
        Ok(self)
    }

    /// Returns `true` when the page ending at `page_number` was the last one.
    pub(super) fn is_last_page(self, page_number: u32, total_num_results: u32) -> bool {
        let seen = u64::from(page_number).saturating_mul(u64::from(self.page_size));
        !self.follow_pages || seen >= u64::from(total_num_results)
    }
}

/// Outcome of a paginated assignment refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagingSummary {
    /// Page numbers fetched, in request order.
    pub pages: Vec<u32>,
    /// Number of assignments refreshed across all pages.
    pub assignments_refreshed: usize,
}

/// HIT synchronization service.
///
/// Holds the repository, the marketplace client handle, the clock, and the
/// sync settings. Every operation awaits its calls one after another.
#[derive(Clone)]
pub struct HitSyncService<R, M, C>
where
    R: HitRepository,
    M: MarketplaceClient,
    C: Clock + Send + Sync,
{
    pub(super) repository: Arc<R>,
    pub(super) marketplace: Arc<M>,
    pub(super) clock: Arc<C>,
    pub(super) config: SyncConfig,
}

impl<R, M, C> HitSyncService<R, M, C>
where
    R: HitRepository,
    M: MarketplaceClient,
    C: Clock + Send + Sync,
{
    /// Creates a new sync service.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        marketplace: Arc<M>,
        clock: Arc<C>,
        config: SyncConfig,
    ) -> Self {
        Self {
            repository,
            marketplace,
            clock,
            config,
        }
    }

    /// Returns the sync settings.
    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns paging that follows every page at the configured size.
    #[must_use]
    pub const fn default_paging(&self) -> AssignmentPaging {
        AssignmentPaging::new(self.config.assignment_page_size())
    }

    pub(super) async fn find_hit_or_error(&self, hit_id: HitId) -> HitSyncResult<Hit> {
        self.repository
            .find_hit(hit_id)
            .await?
            .ok_or(HitSyncError::HitNotFound(hit_id))
    }

    /// Stores a new HIT locally and publishes it to the marketplace.
    ///
    /// The returned HIT carries the marketplace identifier; its status stays
    /// unset until the next refresh.
    ///
    /// # Errors
    ///
    /// Returns repository errors when storage fails and marketplace errors
    /// when creation is refused. On marketplace failure the local record
    /// remains without a marketplace identifier.
    pub async fn create_hit(&self, draft: HitDraft) -> HitSyncResult<Hit> {
        let hit = Hit::new(draft, &*self.clock);
        self.repository.store_hit(&hit).await?;
        self.publish(hit).await
    }

    /// Persists local HIT state, publishing it first if it has never been
    /// created on the marketplace.
    ///
    /// # Errors
    ///
    /// Returns repository or marketplace errors.
    pub async fn save_hit(&self, hit: Hit) -> HitSyncResult<Hit> {
        if self.repository.find_hit(hit.id()).await?.is_some() {
            self.repository.update_hit(&hit).await?;
        } else {
            self.repository.store_hit(&hit).await?;
        }
        if hit.remote_id().is_some() {
            return Ok(hit);
        }
        self.publish(hit).await
    }

    async fn publish(&self, mut hit: Hit) -> HitSyncResult<Hit> {
        let request = hit.to_remote_request(
            self.config.external_question(hit.id()),
            self.config.response_groups().to_vec(),
        );
        let created = self.marketplace.create_hit(request).await?;
        hit.record_remote_creation(created, &*self.clock);
        self.repository.update_hit(&hit).await?;
        info!(
            hit_id = %hit.id(),
            remote_hit_id = ?hit.remote_id().map(RemoteHitId::as_str),
            "published HIT to marketplace"
        );
        Ok(hit)
    }

    /// Finds a HIT by local identifier.
    ///
    /// # Errors
    ///
    /// Returns persistence errors from the repository.
    pub async fn find_hit(&self, hit_id: HitId) -> HitSyncResult<Option<Hit>> {
        Ok(self.repository.find_hit(hit_id).await?)
    }

    /// Finds the local mirror of a marketplace HIT.
    ///
    /// # Errors
    ///
    /// Returns persistence errors from the repository.
    pub async fn find_hit_by_remote_id(
        &self,
        remote_id: &RemoteHitId,
    ) -> HitSyncResult<Option<Hit>> {
        Ok(self.repository.find_hit_by_remote_id(remote_id).await?)
    }

    /// Lists every stored HIT.
    ///
    /// # Errors
    ///
    /// Returns persistence errors from the repository.
    pub async fn list_hits(&self) -> HitSyncResult<Vec<Hit>> {
        Ok(self.repository.list_hits().await?)
    }

    /// Overwrites the local HIT from a marketplace snapshot.
    ///
    /// Fetches the snapshot when none is supplied. With
    /// [`AssignmentCascade::Refresh`] every page of assignments is refreshed
    /// afterwards at the configured page size.
    ///
    /// # Errors
    ///
    /// Returns [`HitSyncError::HitNotFound`] for unknown HITs,
    /// [`HitDomainError::MissingRemoteId`] for unpublished ones, translation
    /// errors for unknown statuses, and marketplace or repository errors.
    pub async fn refresh_hit(
        &self,
        hit_id: HitId,
        payload: Option<RemoteHit>,
        cascade: AssignmentCascade,
    ) -> HitSyncResult<Hit> {
        let mut hit = self.find_hit_or_error(hit_id).await?;
        let remote_id = hit.require_remote_id()?.clone();
        let snapshot = match payload {
            Some(snapshot) => snapshot,
            None => self.marketplace.get_hit(&remote_id).await?,
        };
        hit.apply_remote_snapshot(&snapshot, &*self.clock)?;
        self.repository.update_hit(&hit).await?;
        debug!(
            hit_id = %hit_id,
            status = ?hit.status(),
            "refreshed HIT from marketplace"
        );

        if cascade == AssignmentCascade::Refresh {
            self.refresh_assignment_pages(&hit, &remote_id, self.default_paging())
                .await?;
        }
        Ok(hit)
    }

    /// Refreshes the assignments of a HIT page by page.
    ///
    /// Each page's assignments are mirrored locally (created when unseen)
    /// and refreshed with their page payload. Paging stops after the first
    /// page unless `follow_pages` is set, once `page * page_size` reaches
    /// the reported total, or when a page comes back empty.
    ///
    /// # Errors
    ///
    /// Returns [`HitDomainError::InvalidPaging`] for a zero page or page
    /// size, plus the errors of [`Self::refresh_hit`].
    pub async fn refresh_assignments(
        &self,
        hit_id: HitId,
        paging: AssignmentPaging,
    ) -> HitSyncResult<PagingSummary> {
        let hit = self.find_hit_or_error(hit_id).await?;
        let remote_id = hit.require_remote_id()?.clone();
        self.refresh_assignment_pages(&hit, &remote_id, paging).await
    }

    async fn refresh_assignment_pages(
        &self,
        hit: &Hit,
        remote_id: &RemoteHitId,
        paging: AssignmentPaging,
    ) -> HitSyncResult<PagingSummary> {
        let valid_paging = paging.validate()?;
        let mut summary = PagingSummary::default();
        let mut page_number = valid_paging.start_page;
        loop {
            let page = self
                .marketplace
                .get_assignments(remote_id, page_number, valid_paging.page_size)
                .await?;
            summary.pages.push(page_number);
            debug!(
                hit_id = %hit.id(),
                page = page_number,
                fetched = page.assignments.len(),
                total = page.total_num_results,
                "fetched assignment page"
            );
            for remote in &page.assignments {
                self.sync_assignment(hit, remote_id, remote).await?;
                summary.assignments_refreshed += 1;
            }

            if page.assignments.is_empty()
                || valid_paging.is_last_page(page_number, page.total_num_results)
            {
                break;
            }
            match page_number.checked_add(1) {
                Some(next) => page_number = next,
                None => break,
            }
        }
        Ok(summary)
    }

    /// Expires a HIT on the marketplace, then refreshes it.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::refresh_hit`].
    pub async fn expire_hit(&self, hit_id: HitId) -> HitSyncResult<Hit> {
        let hit = self.find_hit_or_error(hit_id).await?;
        let remote_id = hit.require_remote_id()?;
        self.marketplace.expire_hit(remote_id).await?;
        info!(hit_id = %hit_id, remote_hit_id = %remote_id, "expired HIT");
        self.refresh_hit(hit_id, None, AssignmentCascade::Skip).await
    }

    /// Adds assignments or lifetime to a HIT, then refreshes it.
    ///
    /// # Errors
    ///
    /// Returns [`HitDomainError::EmptyExtension`] when neither increment is
    /// set, plus the errors of [`Self::refresh_hit`].
    pub async fn extend_hit(&self, hit_id: HitId, extension: HitExtension) -> HitSyncResult<Hit> {
        let hit = self.find_hit_or_error(hit_id).await?;
        let remote_id = hit.require_remote_id()?;
        if extension.is_empty() {
            return Err(HitDomainError::EmptyExtension(remote_id.clone()).into());
        }
        self.marketplace.extend_hit(remote_id, extension).await?;
        info!(
            hit_id = %hit_id,
            assignments_increment = ?extension.assignments_increment,
            expiration_increment_seconds = ?extension.expiration_increment_seconds,
            "extended HIT"
        );
        self.refresh_hit(hit_id, None, AssignmentCascade::Skip).await
    }

    /// Moves a HIT into `Reviewing`, or back to `Reviewable` when `revert`
    /// is set, then refreshes it.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::refresh_hit`].
    pub async fn set_reviewing(&self, hit_id: HitId, revert: bool) -> HitSyncResult<Hit> {
        let hit = self.find_hit_or_error(hit_id).await?;
        let remote_id = hit.require_remote_id()?;
        self.marketplace.set_reviewing(remote_id, revert).await?;
        debug!(hit_id = %hit_id, revert, "changed HIT review state");
        self.refresh_hit(hit_id, None, AssignmentCascade::Skip).await
    }

    /// Disables a HIT: refreshes it with its assignments, removes it from
    /// the marketplace (outstanding submissions are approved remotely), and
    /// refreshes it again.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::refresh_hit`].
    pub async fn disable_hit(&self, hit_id: HitId) -> HitSyncResult<Hit> {
        let hit = self
            .refresh_hit(hit_id, None, AssignmentCascade::Refresh)
            .await?;
        let remote_id = hit.require_remote_id()?;
        self.marketplace.dispose_hit(remote_id).await?;
        info!(hit_id = %hit_id, remote_hit_id = %remote_id, "disabled HIT");
        self.refresh_hit(hit_id, None, AssignmentCascade::Skip).await
    }

    /// Disposes of a reviewable HIT whose assignments are all resolved.
    ///
    /// A HIT already mirrored as `Disposed` is returned unchanged without
    /// any marketplace call.
    ///
    /// # Errors
    ///
    /// Returns [`HitDisposalError`] when the refreshed HIT is not
    /// `Reviewable` or an assignment is neither approved nor rejected, plus
    /// the errors of [`Self::refresh_hit`].
    pub async fn dispose_hit(&self, hit_id: HitId) -> HitSyncResult<Hit> {
        let stored = self.find_hit_or_error(hit_id).await?;
        if stored.is_disposed() {
            debug!(hit_id = %hit_id, "HIT already disposed");
            return Ok(stored);
        }

        let refreshed = self
            .refresh_hit(hit_id, None, AssignmentCascade::Refresh)
            .await?;
        let remote_id = refreshed.require_remote_id()?;
        if let Err(err) = self.ensure_disposable(&refreshed, remote_id).await {
            warn!(hit_id = %hit_id, error = %err, "HIT cannot be disposed");
            return Err(err);
        }

        self.marketplace.dispose_hit(remote_id).await?;
        info!(hit_id = %hit_id, remote_hit_id = %remote_id, "disposed HIT");
        self.refresh_hit(hit_id, None, AssignmentCascade::Skip).await
    }

    async fn ensure_disposable(&self, hit: &Hit, remote_id: &RemoteHitId) -> HitSyncResult<()> {
        if hit.status() != Some(HitStatus::Reviewable) {
            let status = hit
                .status()
                .map_or("unset", HitStatus::as_remote_str)
                .to_owned();
            return Err(HitDisposalError::NotReviewable {
                hit: remote_id.clone(),
                status,
            }
            .into());
        }

        let assignments = self.repository.list_assignments_for_hit(hit.id()).await?;
        if let Some(unresolved) = assignments.iter().find(|assignment| !assignment.is_resolved()) {
            return Err(HitDisposalError::UnresolvedAssignment {
                hit: remote_id.clone(),
                assignment: unresolved.id().clone(),
            }
            .into());
        }
        Ok(())
    }
}

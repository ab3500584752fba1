//! RPC Method Handlers
//!
//! Thin adapters: check the caller, call one application service, map errors.

use crate::error::{throttled, to_rpc_error};
use crate::rate_limiter::RateLimiter;
use crate::types::{
    ActivateRequest, ApplicationRequest, ChangeStatusRequest, CompanyRequest, CreateJobRequest,
    HistoryResponse, JobRequest, JobViewResponse, PublicJobRequest, RecountResponse,
    ScheduleInterviewRequest, SubmitApplicationRequest, SweepRequest, SweepResponse,
    UpgradeRequest, ViewResponse, WithdrawResponse,
};
use jsonrpsee::types::ErrorObjectOwned;
use recruit_core::application::{
    ApplicationLifecycleManager, JobDetails, JobPublishingManager, QuotaStatus,
    SubscriptionManager,
};
use recruit_core::domain::{Application, Job, Subscription};
use recruit_core::error::AppError;
use std::sync::Arc;

type RpcResult<T> = Result<T, ErrorObjectOwned>;

/// Application services the RPC surface dispatches to
#[derive(Clone)]
pub struct RpcServices {
    pub lifecycle: Arc<ApplicationLifecycleManager>,
    pub publishing: Arc<JobPublishingManager>,
    pub subscriptions: Arc<SubscriptionManager>,
}

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    services: RpcServices,
    rate_limiter: Arc<RateLimiter>,
}

impl RpcHandler {
    pub fn new(services: RpcServices, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            services,
            rate_limiter,
        }
    }

    /// Reject anonymous calls, then charge the caller's rate-limit bucket
    async fn admit(&self, actor_id: &str) -> RpcResult<()> {
        if actor_id.trim().is_empty() {
            return Err(to_rpc_error(AppError::Validation(
                "actor_id is required".to_string(),
            )));
        }
        if !self.rate_limiter.check(actor_id).await {
            return Err(throttled());
        }
        Ok(())
    }

    /// application.submit.v1
    pub async fn submit_application(
        &self,
        params: SubmitApplicationRequest,
    ) -> RpcResult<Application> {
        self.admit(&params.actor_id).await?;
        self.services
            .lifecycle
            .submit(&params.job_id, &params.actor_id, params.cover_letter)
            .await
            .map_err(to_rpc_error)
    }

    /// application.get.v1
    pub async fn get_application(&self, params: ApplicationRequest) -> RpcResult<Application> {
        self.admit(&params.actor_id).await?;
        self.services
            .lifecycle
            .get(&params.application_id, &params.actor_id)
            .await
            .map_err(to_rpc_error)
    }

    /// application.history.v1
    pub async fn application_history(
        &self,
        params: ApplicationRequest,
    ) -> RpcResult<HistoryResponse> {
        self.admit(&params.actor_id).await?;
        let events = self
            .services
            .lifecycle
            .history(&params.application_id, &params.actor_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(HistoryResponse {
            application_id: params.application_id,
            events,
        })
    }

    /// application.status.v1
    pub async fn change_status(&self, params: ChangeStatusRequest) -> RpcResult<Application> {
        self.admit(&params.actor_id).await?;
        self.services
            .lifecycle
            .transition(
                &params.application_id,
                &params.actor_id,
                params.status,
                params.notes,
            )
            .await
            .map_err(to_rpc_error)
    }

    /// application.schedule_interview.v1
    pub async fn schedule_interview(
        &self,
        params: ScheduleInterviewRequest,
    ) -> RpcResult<Application> {
        self.admit(&params.actor_id).await?;
        self.services
            .lifecycle
            .schedule_interview(
                &params.application_id,
                &params.actor_id,
                params.scheduled_at,
                params.notes,
            )
            .await
            .map_err(to_rpc_error)
    }

    /// application.withdraw.v1
    pub async fn withdraw_application(
        &self,
        params: ApplicationRequest,
    ) -> RpcResult<WithdrawResponse> {
        self.admit(&params.actor_id).await?;
        let withdrawn = self
            .services
            .lifecycle
            .withdraw(&params.application_id, &params.actor_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(WithdrawResponse {
            application_id: withdrawn.id,
            job_id: withdrawn.job_id,
            withdrawn: true,
        })
    }

    /// application.view.v1
    pub async fn view_application(&self, params: ApplicationRequest) -> RpcResult<ViewResponse> {
        self.admit(&params.actor_id).await?;
        let counted = self
            .services
            .lifecycle
            .record_view(&params.application_id, &params.actor_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(ViewResponse {
            application_id: params.application_id,
            counted,
        })
    }

    /// job.create.v1
    pub async fn create_job(&self, params: CreateJobRequest) -> RpcResult<Job> {
        self.admit(&params.actor_id).await?;
        self.services
            .publishing
            .create(&params.company_id, &params.actor_id, params.job)
            .await
            .map_err(to_rpc_error)
    }

    /// job.publish.v1
    pub async fn publish_job(&self, params: JobRequest) -> RpcResult<Job> {
        self.admit(&params.actor_id).await?;
        self.services
            .publishing
            .publish(&params.job_id, &params.actor_id)
            .await
            .map_err(to_rpc_error)
    }

    /// job.close.v1
    pub async fn close_job(&self, params: JobRequest) -> RpcResult<Job> {
        self.admit(&params.actor_id).await?;
        self.services
            .publishing
            .close(&params.job_id, &params.actor_id)
            .await
            .map_err(to_rpc_error)
    }

    /// job.get.v1
    pub async fn get_job(&self, params: PublicJobRequest) -> RpcResult<JobDetails> {
        self.services
            .publishing
            .get(&params.job_id)
            .await
            .map_err(to_rpc_error)
    }

    /// job.view.v1
    pub async fn view_job(&self, params: PublicJobRequest) -> RpcResult<JobViewResponse> {
        self.services
            .publishing
            .record_job_view(&params.job_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(JobViewResponse {
            job_id: params.job_id,
            recorded: true,
        })
    }

    /// job.recount_applications.v1
    pub async fn recount_applications(&self, params: JobRequest) -> RpcResult<RecountResponse> {
        self.admit(&params.actor_id).await?;
        let application_count = self
            .services
            .publishing
            .repair_application_count(&params.job_id, &params.actor_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(RecountResponse {
            job_id: params.job_id,
            application_count,
        })
    }

    /// subscription.quota.v1
    pub async fn quota(&self, params: CompanyRequest) -> RpcResult<QuotaStatus> {
        self.admit(&params.actor_id).await?;
        self.services
            .subscriptions
            .quota_status(&params.company_id, &params.actor_id)
            .await
            .map_err(to_rpc_error)
    }

    /// subscription.upgrade.v1
    pub async fn upgrade(&self, params: UpgradeRequest) -> RpcResult<Subscription> {
        self.admit(&params.actor_id).await?;
        self.services
            .subscriptions
            .upgrade(&params.company_id, &params.actor_id, params.plan_type)
            .await
            .map_err(to_rpc_error)
    }

    /// subscription.activate.v1
    pub async fn activate(&self, params: ActivateRequest) -> RpcResult<Subscription> {
        self.admit(&params.actor_id).await?;
        self.services
            .subscriptions
            .activate(&params.subscription_id, &params.actor_id)
            .await
            .map_err(to_rpc_error)
    }

    /// subscription.cancel.v1
    pub async fn cancel_subscription(&self, params: CompanyRequest) -> RpcResult<Subscription> {
        self.admit(&params.actor_id).await?;
        self.services
            .subscriptions
            .cancel(&params.company_id, &params.actor_id)
            .await
            .map_err(to_rpc_error)
    }

    /// subscription.history.v1
    pub async fn subscription_history(
        &self,
        params: CompanyRequest,
    ) -> RpcResult<Vec<Subscription>> {
        self.admit(&params.actor_id).await?;
        self.services
            .subscriptions
            .history(&params.company_id, &params.actor_id)
            .await
            .map_err(to_rpc_error)
    }

    /// admin.sweep_expired.v1 (params may be omitted entirely)
    pub async fn sweep_expired(&self, _params: Option<SweepRequest>) -> RpcResult<SweepResponse> {
        let expired = self
            .services
            .publishing
            .sweep_expired()
            .await
            .map_err(to_rpc_error)?;

        Ok(SweepResponse { expired })
    }
}

use async_trait::async_trait;
use reqwest::{Client, Response};

use super::{GatewayError, TaskGateway};
use crate::config::AppConfig;
use crate::model::{NewTask, Task, TaskId, TaskPatch, UserId};

/// [`TaskGateway`] backed by the students REST API (or anything speaking the same `/todos` dialect).
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &AppConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn user_tasks_url(&self, user_id: UserId) -> String {
        format!("{}/todos?userId={}", self.base_url, user_id)
    }

    fn task_url(&self, id: TaskId) -> String {
        format!("{}/todos/{}", self.base_url, id)
    }
}

fn ensure_success(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(GatewayError::Status {
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl TaskGateway for HttpGateway {
    async fn fetch_tasks(&self, user_id: UserId) -> Result<Vec<Task>, GatewayError> {
        let url = self.user_tasks_url(user_id);
        tracing::debug!(url = url.as_str(), "fetching tasks");
        let response = ensure_success(self.client.get(url).send().await?)?;
        Ok(response.json::<Vec<Task>>().await?)
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, GatewayError> {
        let response = ensure_success(
            self.client
                .post(self.collection_url())
                .json(task)
                .send()
                .await?,
        )?;
        Ok(response.json::<Task>().await?)
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), GatewayError> {
        ensure_success(self.client.delete(self.task_url(id)).send().await?)?;
        Ok(())
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, GatewayError> {
        let response = ensure_success(
            self.client
                .patch(self.task_url(id))
                .json(patch)
                .send()
                .await?,
        )?;
        Ok(response.json::<Task>().await?)
    }
}

//! Collection tests against an in-memory cloud
//!
//! The fake backend serves canned compartments, instances and metric values
//! and records every call so ordering and query shape can be checked.

use super::*;
use crate::cloud::{async_trait, ComputeApi, IdentityApi, MonitoringApi, UsageApi};
use crate::error::ReportError;
use crate::models::{
    AggregatedDatapoint, Compartment, CompartmentLifecycleState, CostLineItem, Instance,
    InstanceLifecycleState, MetricData, UsageAggregation, UsageRequest,
};
use crate::report::{generate_report, ReportOptions};
use chrono::{TimeZone, Utc};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeCloud {
    compartments: Vec<Compartment>,
    instances: HashMap<String, Vec<Instance>>,
    /// Metric value returned per instance id; a missing id yields no streams
    cpu_by_instance: HashMap<String, f64>,
    costs: Vec<CostLineItem>,
    calls: Mutex<Vec<String>>,
    queries: Mutex<Vec<MetricQuery>>,
    usage_requests: Mutex<Vec<UsageRequest>>,
    fail_monitoring: bool,
}

impl FakeCloud {
    fn compartment(mut self, id: &str, name: &str, instances: Vec<Instance>) -> Self {
        self.compartments.push(Compartment {
            id: id.to_string(),
            name: name.to_string(),
            lifecycle_state: CompartmentLifecycleState::Active,
        });
        self.instances.insert(id.to_string(), instances);
        self
    }

    fn cpu(mut self, instance_id: &str, value: f64) -> Self {
        self.cpu_by_instance.insert(instance_id.to_string(), value);
        self
    }

    fn cost(mut self, item: CostLineItem) -> Self {
        self.costs.push(item);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn instance(id: &str, name: &str, state: InstanceLifecycleState) -> Instance {
    Instance {
        id: id.to_string(),
        display_name: name.to_string(),
        lifecycle_state: state,
    }
}

fn running(id: &str, name: &str) -> Instance {
    instance(id, name, InstanceLifecycleState::Running)
}

#[async_trait]
impl IdentityApi for FakeCloud {
    async fn list_compartments(&self, tenancy_id: &str) -> crate::Result<Vec<Compartment>> {
        self.calls.lock().unwrap().push(format!("compartments:{}", tenancy_id));
        Ok(self.compartments.clone())
    }
}

#[async_trait]
impl ComputeApi for FakeCloud {
    async fn list_instances(&self, compartment_id: &str) -> crate::Result<Vec<Instance>> {
        self.calls.lock().unwrap().push(format!("instances:{}", compartment_id));
        Ok(self.instances.get(compartment_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl MonitoringApi for FakeCloud {
    async fn summarize_metrics_data(
        &self,
        compartment_id: &str,
        query: &MetricQuery,
    ) -> crate::Result<Vec<MetricData>> {
        if self.fail_monitoring {
            return Err(ReportError::Api {
                service: "monitoring",
                status: 429,
                body: "TooManyRequests".to_string(),
            });
        }

        self.calls.lock().unwrap().push(format!("metrics:{}", compartment_id));
        self.queries.lock().unwrap().push(query.clone());

        // The fake resolves the instance from the order of metric calls
        let served = self.queries.lock().unwrap().len();
        let instance_id = self
            .compartments
            .iter()
            .flat_map(|c| self.instances.get(&c.id).cloned().unwrap_or_default())
            .filter(|i| i.is_running())
            .nth(served - 1)
            .map(|i| i.id);

        let value = instance_id.and_then(|id| self.cpu_by_instance.get(&id).copied());
        Ok(value
            .map(|v| {
                vec![MetricData {
                    namespace: query.namespace.clone(),
                    name: "CpuUtilization".to_string(),
                    dimensions: HashMap::new(),
                    aggregated_datapoints: vec![AggregatedDatapoint {
                        timestamp: query.start_time.clone(),
                        value: v,
                    }],
                }]
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl UsageApi for FakeCloud {
    async fn request_summarized_usages(
        &self,
        request: &UsageRequest,
    ) -> crate::Result<UsageAggregation> {
        self.calls.lock().unwrap().push("usage".to_string());
        self.usage_requests.lock().unwrap().push(request.clone());
        Ok(UsageAggregation {
            items: self.costs.clone(),
        })
    }
}

fn window() -> ReportWindow {
    ReportWindow::ending_at(Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap())
}

fn context(cloud: &Arc<FakeCloud>) -> CloudContext {
    CloudContext::from_backend("ocid1.tenancy.test", cloud.clone())
}

mod metric_collection_tests {
    use super::*;

    #[tokio::test]
    async fn test_only_running_instances_are_queried() {
        let cloud = Arc::new(
            FakeCloud::default()
                .compartment(
                    "c1",
                    "prod",
                    vec![
                        running("i1", "web"),
                        instance("i2", "batch", InstanceLifecycleState::Stopped),
                        instance("i3", "old", InstanceLifecycleState::Terminated),
                    ],
                )
                .cpu("i1", 1.0),
        );
        let logger = ReportLogger::new("ocid1.tenancy.test");

        let records = collect_performance(&context(&cloud), &window(), CollectOptions::default(), &logger)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert!(records.get("web").is_some());
        assert!(records.get("batch").is_none());
        assert_eq!(cloud.queries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_query_shape_and_call_order() {
        let cloud = Arc::new(
            FakeCloud::default()
                .compartment("c1", "prod", vec![running("i1", "web")])
                .compartment("c2", "dev", vec![running("i2", "api")])
                .cpu("i1", 1.0)
                .cpu("i2", 2.0),
        );
        let logger = ReportLogger::new("ocid1.tenancy.test");

        collect_performance(&context(&cloud), &window(), CollectOptions::default(), &logger)
            .await
            .unwrap();

        assert_eq!(
            cloud.calls(),
            vec![
                "compartments:ocid1.tenancy.test",
                "instances:c1",
                "metrics:c1",
                "instances:c2",
                "metrics:c2",
            ]
        );

        let queries = cloud.queries.lock().unwrap();
        assert_eq!(queries[0].namespace, "oci_computeagent");
        assert_eq!(queries[0].query, "CpuUtilization[1m].mean()");
        assert_eq!(queries[0].start_time, "2024-03-08T00:00:00+00:00");
        assert_eq!(queries[0].end_time, "2024-03-15T00:00:00+00:00");
    }

    #[tokio::test]
    async fn test_scoped_query_filters_by_resource() {
        let cloud = Arc::new(
            FakeCloud::default()
                .compartment("c1", "prod", vec![running("ocid1.instance.x", "web")])
                .cpu("ocid1.instance.x", 1.0),
        );
        let logger = ReportLogger::new("ocid1.tenancy.test");
        let options = CollectOptions {
            scope_query_to_instance: true,
            ..Default::default()
        };

        collect_performance(&context(&cloud), &window(), options, &logger)
            .await
            .unwrap();

        let queries = cloud.queries.lock().unwrap();
        assert_eq!(
            queries[0].query,
            "CpuUtilization[1m]{resourceId = \"ocid1.instance.x\"}.mean()"
        );
    }

    #[tokio::test]
    async fn test_same_name_collapses_by_default() {
        let cloud = Arc::new(
            FakeCloud::default()
                .compartment("c1", "prod", vec![running("i1", "web")])
                .compartment("c2", "dev", vec![running("i2", "web")])
                .cpu("i1", 1.0)
                .cpu("i2", 3.0),
        );
        let logger = ReportLogger::new("ocid1.tenancy.test");

        let records = collect_performance(&context(&cloud), &window(), CollectOptions::default(), &logger)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        let record = records.get("web").unwrap();
        assert_eq!(record.samples.len(), 2);
        assert_eq!(record.samples[0].compartment_name, "prod");
        assert_eq!(record.samples[1].compartment_name, "dev");
    }

    #[tokio::test]
    async fn test_instance_id_keying_keeps_instances_apart() {
        let cloud = Arc::new(
            FakeCloud::default()
                .compartment("c1", "prod", vec![running("i1", "web")])
                .compartment("c2", "dev", vec![running("i2", "web")])
                .cpu("i1", 1.0)
                .cpu("i2", 3.0),
        );
        let logger = ReportLogger::new("ocid1.tenancy.test");
        let options = CollectOptions {
            key_strategy: KeyStrategy::InstanceId,
            ..Default::default()
        };

        let records = collect_performance(&context(&cloud), &window(), options, &logger)
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records.get("i2").unwrap().display_name(), "web");
    }

    #[tokio::test]
    async fn test_monitoring_failure_aborts_collection() {
        let cloud = Arc::new(FakeCloud {
            fail_monitoring: true,
            ..FakeCloud::default().compartment("c1", "prod", vec![running("i1", "web")])
        });
        let logger = ReportLogger::new("ocid1.tenancy.test");

        let err = collect_performance(&context(&cloud), &window(), CollectOptions::default(), &logger)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Api { status: 429, .. }));
    }
}

mod cost_collection_tests {
    use super::*;

    #[tokio::test]
    async fn test_usage_request_shape() {
        let cloud = Arc::new(FakeCloud::default());
        let logger = ReportLogger::new("ocid1.tenancy.test");

        let items = collect_costs(&context(&cloud), &window(), &logger).await.unwrap();
        assert!(items.is_empty());

        let requests = cloud.usage_requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tenant_id, "ocid1.tenancy.test");
        assert_eq!(requests[0].granularity, "DAILY");
        assert_eq!(requests[0].time_usage_started, "2024-03-08T00:00:00+00:00");
        assert_eq!(requests[0].time_usage_ended, "2024-03-15T00:00:00+00:00");
    }

    #[tokio::test]
    async fn test_items_keep_backend_order_and_duplicates() {
        let item = |desc: &str, amount: f64| CostLineItem {
            description: Some(desc.to_string()),
            computed_amount: Some(amount),
            ..Default::default()
        };
        let cloud = Arc::new(
            FakeCloud::default()
                .cost(item("Compute", 1.5))
                .cost(item("Storage", 0.25))
                .cost(item("Compute", 2.0)),
        );
        let logger = ReportLogger::new("ocid1.tenancy.test");

        let items = collect_costs(&context(&cloud), &window(), &logger).await.unwrap();
        let descs: Vec<_> = items.iter().map(|i| i.description_or_default()).collect();
        assert_eq!(descs, vec!["Compute", "Storage", "Compute"]);
    }
}

mod pipeline_tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_report_end_to_end() {
        let cloud = Arc::new(
            FakeCloud::default()
                .compartment("c1", "prod", vec![running("i1", "web"), running("i2", "db")])
                .compartment("c2", "dev", vec![running("i3", "web")])
                .cpu("i1", 2.0)
                .cpu("i2", 50.0)
                .cpu("i3", 4.0)
                .cost(CostLineItem::default()),
        );
        let logger = ReportLogger::new("ocid1.tenancy.test");

        let report = generate_report(&context(&cloud), window(), ReportOptions::default(), &logger)
            .await
            .unwrap();

        assert_eq!(report.idle_instances.len(), 1);
        assert_eq!(report.idle_instances[0].instance_name, "web");
        assert_eq!(report.idle_instances[0].avg_cpu_util, 3.0);
        assert_eq!(report.idle_instances[0].compartment, "prod");
        assert_eq!(report.costs.len(), 1);
        assert_eq!(cloud.calls().last().map(String::as_str), Some("usage"));
    }

    #[tokio::test]
    async fn test_no_running_instances_gives_empty_idle_list() {
        let cloud = Arc::new(FakeCloud::default().compartment(
            "c1",
            "prod",
            vec![instance("i1", "web", InstanceLifecycleState::Stopped)],
        ));
        let logger = ReportLogger::new("ocid1.tenancy.test");

        let report = generate_report(&context(&cloud), window(), ReportOptions::default(), &logger)
            .await
            .unwrap();

        assert!(report.idle_instances.is_empty());
        assert!(cloud.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_metric_result_aborts_after_cost_collection() {
        // i1 has no cpu value configured so the fake returns no streams
        let cloud = Arc::new(FakeCloud::default().compartment("c1", "prod", vec![running("i1", "web")]));
        let logger = ReportLogger::new("ocid1.tenancy.test");

        let err = generate_report(&context(&cloud), window(), ReportOptions::default(), &logger)
            .await
            .unwrap_err();

        assert!(matches!(err, ReportError::EmptyMetricResponse { .. }));
        assert!(cloud.calls().contains(&"usage".to_string()));
    }
}

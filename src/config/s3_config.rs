use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{Client as S3Client, config::Credentials};

use crate::config::StorageConfig;

pub async fn load_s3_client(config: &StorageConfig) -> S3Client {
    let credentials = Credentials::new(
        config.access_key.clone(),
        config.secret_key.clone(),
        None,
        None,
        "env-credentials",
    );

    let shared = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .credentials_provider(credentials)
        .load()
        .await;

    let mut builder = aws_sdk_s3::config::Builder::from(&shared);
    if let Some(ref endpoint) = config.endpoint {
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }

    let s3_client = S3Client::from_conf(builder.build());

    tracing::info!("Object storage client initialized for bucket {}", config.bucket);

    s3_client
}

use vidwiki_application::AppServices;

pub async fn check(services: &AppServices) {
    for (target, readiness) in services.check_sinks().await {
        if readiness.ready {
            println!("{target:<8} ready");
        } else {
            println!("{target:<8} not ready: {}", readiness.reason);
        }
    }
}

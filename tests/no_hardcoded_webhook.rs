#[test]
fn sources_should_not_hardcode_a_feishu_webhook_token() {
    // Webhook URLs carry the bot token; they must come from the environment.
    let sources = [
        include_str!("../src/notification/webhook.rs"),
        include_str!("../src/notification/dispatcher.rs"),
        include_str!("../src/notification/target.rs"),
        include_str!("../src/cli/notify.rs"),
        include_str!("../src/server/mod.rs"),
    ];
    for src in sources {
        assert!(
            !src.contains("open-apis/bot/v2/hook/"),
            "a Feishu bot webhook url is hardcoded in the sources"
        );
    }
}

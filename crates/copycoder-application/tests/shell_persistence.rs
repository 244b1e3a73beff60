use std::sync::Arc;
use std::time::Duration;

use copycoder_application::{AppShell, MemoryClipboard, RecordingNotifier};
use copycoder_core::clock::SystemClock;
use copycoder_core::config::UploadConfig;
use copycoder_core::project::{AnalysisFocus, ProcessingOption, ProjectInfo, SettingsPatch};
use copycoder_core::prompt::TemplatePromptGenerator;
use copycoder_core::state::Theme;
use copycoder_core::upload::{ImageUploadManager, ObjectUrlRegistry, SelectedFile, SimulatedUpload};
use copycoder_infrastructure::{JsonFileStore, StateRepositoryImpl};
use tempfile::TempDir;

async fn open_shell(dir: &TempDir) -> AppShell {
    let store = JsonFileStore::open(dir.path().join("local_storage.json"))
        .await
        .unwrap();
    let uploads = ImageUploadManager::new(
        Arc::new(ObjectUrlRegistry::new()),
        Arc::new(SimulatedUpload::with_seed(Duration::from_millis(300), 15, 5)),
        Arc::new(SystemClock),
        &UploadConfig::default(),
    );
    let generator =
        TemplatePromptGenerator::with_seed(Duration::from_millis(2500), Arc::new(SystemClock), 5)
            .unwrap();

    AppShell::load(
        uploads,
        Arc::new(generator),
        Arc::new(StateRepositoryImpl::new(Arc::new(store))),
        Arc::new(RecordingNotifier::new()),
        Arc::new(MemoryClipboard::new()),
    )
    .await
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_settings_and_theme_survive_restart() {
    let dir = TempDir::new().unwrap();

    {
        let shell = open_shell(&dir).await;
        assert_eq!(shell.theme(), Theme::Dark);
        shell.toggle_theme().await.unwrap();
        shell
            .update_settings(&SettingsPatch {
                temperature: Some(0.4),
                analysis_focus: Some(AnalysisFocus::Ui),
                processing_option: Some(ProcessingOption::Expert),
            })
            .await
            .unwrap();
    }

    let shell = open_shell(&dir).await;
    assert_eq!(shell.theme(), Theme::Light);
    let settings = shell.settings();
    assert_eq!(settings.temperature, 0.4);
    assert_eq!(settings.analysis_focus, AnalysisFocus::Ui);
    assert_eq!(settings.processing_option, ProcessingOption::Expert);
}

#[tokio::test(start_paused = true)]
async fn test_generated_prompt_reflects_settings_and_is_kept_in_history() {
    let dir = TempDir::new().unwrap();

    let prompt = {
        let shell = open_shell(&dir).await;
        shell
            .update_settings(&SettingsPatch {
                temperature: Some(0.9),
                processing_option: Some(ProcessingOption::Enhanced),
                ..Default::default()
            })
            .await
            .unwrap();
        shell.set_project_info(ProjectInfo {
            name: "Storefront".to_string(),
            ..Default::default()
        });

        let outcome = shell
            .add_files(vec![
                SelectedFile::new("home.png", "image/png", vec![0u8; 128]),
                SelectedFile::new("cart.jpg", "image/jpeg", vec![0u8; 256]),
            ])
            .unwrap();
        shell.wait_for_uploads().await;

        let prompt = shell.generate().await.unwrap();
        let ids: Vec<String> = outcome.accepted.iter().map(|i| i.id.clone()).collect();
        assert_eq!(prompt.image_ids, ids);
        assert!(prompt.content.contains("for Storefront"));
        assert!(prompt.content.contains("Temperature: 0.9 | Processing: enhanced"));
        assert!(prompt.content.contains("## Animation Guidelines"));
        prompt
    };

    let shell = open_shell(&dir).await;
    let history = shell.history();
    assert_eq!(history.prompts, vec![prompt]);
    let names: Vec<&str> = history.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["home.png", "cart.jpg"]);

    shell.clear_history().await.unwrap();
    assert!(open_shell(&dir).await.history().is_empty());
}

// Tests for the agents/resumes store

use agentwatch::db::{AgentRepository, Database, ResumeRepository};
use tempfile::TempDir;

fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(db_path).unwrap();
    (db, temp_dir)
}

#[tokio::test]
async fn test_database_initialization() {
    let (db, _temp) = create_test_db();
    // Basic smoke test - if we get here, DB initialized
    assert!(db.path().contains("test.db"));
    assert!(db.health_check().await.unwrap());
}

#[tokio::test]
async fn test_create_agent() {
    let (db, _temp) = create_test_db();
    let repo = AgentRepository::new(db);

    let agent = repo
        .create("user-1", "screener", Some("Screens resumes".to_string()), None)
        .await
        .unwrap();

    assert!(!agent.agent_id.is_empty());
    assert_eq!(agent.user_id, "user-1");
    assert_eq!(agent.name, "screener");
    assert_eq!(agent.description.as_deref(), Some("Screens resumes"));
    assert!(agent.current_resume_id.is_none());
}

#[tokio::test]
async fn test_get_agent() {
    let (db, _temp) = create_test_db();
    let repo = AgentRepository::new(db);

    let agent = repo
        .create("user-1", "helper", None, Some("Be terse".to_string()))
        .await
        .unwrap();

    let retrieved = repo.get(&agent.agent_id).await.unwrap().unwrap();

    assert_eq!(retrieved.agent_id, agent.agent_id);
    assert_eq!(retrieved.name, "helper");
    assert_eq!(retrieved.custom_instructions.as_deref(), Some("Be terse"));
}

#[tokio::test]
async fn test_agent_not_found() {
    let (db, _temp) = create_test_db();
    let repo = AgentRepository::new(db);

    let result = repo.get("nonexistent-id").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_list_agents_scoped_to_user() {
    let (db, _temp) = create_test_db();
    let repo = AgentRepository::new(db);

    repo.create("user-1", "a", None, None).await.unwrap();
    repo.create("user-1", "b", None, None).await.unwrap();
    repo.create("user-2", "c", None, None).await.unwrap();

    let mine = repo.list(Some("user-1")).await.unwrap();
    assert_eq!(mine.len(), 2);

    let all = repo.list(None).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_set_current_resume() {
    let (db, _temp) = create_test_db();
    let agents = AgentRepository::new(db.clone());
    let resumes = ResumeRepository::new(db);

    let agent = agents.create("user-1", "screener", None, None).await.unwrap();
    let resume = resumes
        .create("user-1", "cv.pdf", "/files/cv.pdf")
        .await
        .unwrap();

    agents
        .set_current_resume(&agent.agent_id, Some(&resume.resume_id))
        .await
        .unwrap();

    let updated = agents.get(&agent.agent_id).await.unwrap().unwrap();
    assert_eq!(
        updated.current_resume_id.as_deref(),
        Some(resume.resume_id.as_str())
    );

    // Clearing the pointer
    agents
        .set_current_resume(&agent.agent_id, None)
        .await
        .unwrap();
    let cleared = agents.get(&agent.agent_id).await.unwrap().unwrap();
    assert!(cleared.current_resume_id.is_none());
}

#[tokio::test]
async fn test_set_current_resume_enforces_referential_integrity() {
    let (db, _temp) = create_test_db();
    let agents = AgentRepository::new(db);

    let agent = agents.create("user-1", "screener", None, None).await.unwrap();

    let result = agents
        .set_current_resume(&agent.agent_id, Some("no-such-resume"))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_deleting_resume_nulls_agent_pointer() {
    let (db, _temp) = create_test_db();
    let agents = AgentRepository::new(db.clone());
    let resumes = ResumeRepository::new(db);

    let agent = agents.create("user-1", "screener", None, None).await.unwrap();
    let resume = resumes
        .create("user-1", "cv.pdf", "/files/cv.pdf")
        .await
        .unwrap();

    agents
        .set_current_resume(&agent.agent_id, Some(&resume.resume_id))
        .await
        .unwrap();

    resumes.delete(&resume.resume_id).await.unwrap();

    // ON DELETE SET NULL: the agent survives with no current resume
    let updated = agents.get(&agent.agent_id).await.unwrap().unwrap();
    assert!(updated.current_resume_id.is_none());
}

#[tokio::test]
async fn test_list_resumes() {
    let (db, _temp) = create_test_db();
    let repo = ResumeRepository::new(db);

    repo.create("user-1", "a.pdf", "/files/a.pdf").await.unwrap();
    repo.create("user-2", "b.pdf", "/files/b.pdf").await.unwrap();

    let mine = repo.list(Some("user-1")).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].filename, "a.pdf");
}

#[tokio::test]
async fn test_delete_resume() {
    let (db, _temp) = create_test_db();
    let repo = ResumeRepository::new(db);

    let resume = repo.create("user-1", "a.pdf", "/files/a.pdf").await.unwrap();
    repo.delete(&resume.resume_id).await.unwrap();

    assert!(repo.get(&resume.resume_id).await.unwrap().is_none());
}

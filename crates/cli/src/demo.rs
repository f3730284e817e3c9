//! Sample data for `--demo`.

use kanban_core::{Phase, PhaseStatus, Project, ProjectId, StatusCode, Task};
use kanban_service::InMemoryBoardService;

/// An in-memory backend with one project spread over three phases. The
/// first phase is completed and locked by the second, which is under way.
pub fn seeded() -> (InMemoryBoardService, ProjectId) {
    let mut service = InMemoryBoardService::new();

    let project = Project {
        description: "Marketing site rebuild".to_string(),
        repo_link: Some("https://github.com/acme/website".to_string()),
        ..Project::new("Website Relaunch")
    };
    let project_id = project.id;
    service.add_project(project);

    let discovery = Phase::new("Discovery", 1, PhaseStatus::Completed);
    let build = Phase::new("Build", 2, PhaseStatus::InProgress);
    let launch = Phase::new("Launch", 3, PhaseStatus::Planning);

    let tasks = [
        ("Stakeholder interviews", StatusCode::COMPLETED, &discovery),
        ("Sitemap draft", StatusCode::IN_REVIEW, &discovery),
        ("Design system", StatusCode::IN_PROGRESS, &build),
        ("Landing page", StatusCode::PLANNING, &build),
        ("Blog migration", StatusCode::PLANNING, &build),
        ("Contact form", StatusCode::IN_REVIEW, &build),
        ("Legacy CMS export", StatusCode::CANCELED, &build),
        ("DNS cutover", StatusCode::PLANNING, &launch),
    ];
    for (name, status, phase) in tasks {
        service.add_task(Task::new(name, status, phase.id));
    }

    for phase in [discovery, build, launch] {
        service.add_phase(project_id, phase);
    }
    (service, project_id)
}

//! Sprint and work-item listings for the boards screens.

use atas_core::company::collect_companies;
use atas_devops::Boards;

use crate::dto::SprintWorkItems;
use crate::error::AppError;

/// The requested sprint (or the active one) with the user's work items.
pub async fn sprint_with_items(
    boards: &Boards,
    sprint_id: Option<&str>,
    company: Option<&str>,
) -> Result<SprintWorkItems, AppError> {
    if let Some(sprint_id) = sprint_id {
        let items = boards.my_work_items(Some(sprint_id), company).await?;
        let sprint = boards.sprint_summary(sprint_id).await?;
        let message = format!("Encontrados {} work items na sprint selecionada", items.len());
        return Ok(SprintWorkItems::new(sprint, items, message));
    }

    let Some(current) = boards.current_sprint().await? else {
        return Ok(SprintWorkItems::no_active_sprint());
    };

    let items = boards.work_items_in_path(&current.path, company).await?;
    let message = match company {
        Some(company) => format!(
            "Encontrados {} work items filtrados por empresa: {}",
            items.len(),
            company
        ),
        None => format!("Encontrados {} work items na sprint ativa", items.len()),
    };

    Ok(SprintWorkItems::new(current.summary(), items, message))
}

/// Companies named in the titles of the user's work items in the active sprint.
pub async fn companies(boards: &Boards) -> Result<Vec<String>, AppError> {
    let items = boards.my_work_items(None, None).await?;
    Ok(collect_companies(&items))
}

/// Form input and validation
///
/// Each form is the raw, string-typed body of a submitted HTML form. Every
/// field defaults to empty so a missing field is reported as a field error
/// rather than rejected during deserialization. `clean()` trims the input,
/// runs the `validator` rules, and on success returns a typed draft.
///
/// Drafts never carry ownership. The handler attaches the owner (projects)
/// or the parent project (tasks) from server-side state, so those fields
/// cannot be spoofed from the request body; unknown form fields are ignored.
///
/// # Example
///
/// ```
/// use tasktrack_shared::forms::ProjectForm;
///
/// let form = ProjectForm { name: "  Website ".to_string(), description: String::new() };
/// let errors = form.clean().unwrap_err();
///
/// assert!(errors.get("name").is_empty());
/// assert_eq!(errors.get("description"), ["This field is required."]);
/// ```

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::auth::password::validate_password_strength;
use crate::models::{
    project::{CreateProject, Project, UpdateProject},
    task::{CreateTask, Task, UpdateTask},
};

const REQUIRED: &str = "This field is required.";

/// Accepted `due_date` input formats, tried in order
pub const DATE_INPUT_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

/// Field-keyed validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    /// Key for errors that belong to the form as a whole
    pub const NON_FIELD: &'static str = "__all__";

    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message for a field
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// Adds a message that is not tied to a field
    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(Self::NON_FIELD, message);
    }

    /// Messages for a field; empty when the field is valid
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Messages not tied to a field
    pub fn non_field(&self) -> &[String] {
        self.get(Self::NON_FIELD)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names of the fields that have errors
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::new();

        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({}).", error.code));
                form_errors.add(&field.to_string(), message);
            }
        }

        form_errors
    }
}

fn run_validators(form: &impl Validate) -> Result<(), FormErrors> {
    form.validate().map_err(FormErrors::from)
}

fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn valid_due_date(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", REQUIRED));
    }
    if parse_date(value).is_none() {
        return Err(invalid("invalid_date", "Enter a valid date."));
    }
    Ok(())
}

fn valid_username(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", REQUIRED));
    }

    let allowed = |c: char| c.is_alphanumeric() || "@.+-_".contains(c);
    if !value.chars().all(allowed) {
        return Err(invalid(
            "invalid_username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

/// Parses a date in any of [`DATE_INPUT_FORMATS`]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Project create/edit form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ProjectForm {
    #[serde(default)]
    #[validate(
        custom(function = "required", message = "This field is required."),
        length(max = 100, message = "Ensure this value has at most 100 characters.")
    )]
    pub name: String,

    #[serde(default)]
    #[validate(custom(function = "required", message = "This field is required."))]
    pub description: String,
}

/// Validated project fields, without an owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
}

impl ProjectForm {
    fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
        }
    }

    /// Validates the submission
    pub fn clean(&self) -> Result<ProjectDraft, FormErrors> {
        let form = self.trimmed();
        run_validators(&form)?;

        Ok(ProjectDraft {
            name: form.name,
            description: form.description,
        })
    }
}

impl From<&Project> for ProjectForm {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone(),
        }
    }
}

impl ProjectDraft {
    /// Attaches the owner for insertion
    pub fn owned_by(self, owner: Uuid) -> CreateProject {
        CreateProject {
            name: self.name,
            description: self.description,
            created_by: owner,
        }
    }
}

impl From<ProjectDraft> for UpdateProject {
    fn from(draft: ProjectDraft) -> Self {
        Self {
            name: draft.name,
            description: draft.description,
        }
    }
}

/// Task create/edit form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TaskForm {
    #[serde(default)]
    #[validate(
        custom(function = "required", message = "This field is required."),
        length(max = 100, message = "Ensure this value has at most 100 characters.")
    )]
    pub title: String,

    #[serde(default)]
    #[validate(custom(function = "required", message = "This field is required."))]
    pub description: String,

    #[serde(default)]
    #[validate(
        custom(function = "required", message = "This field is required."),
        length(max = 20, message = "Ensure this value has at most 20 characters.")
    )]
    pub status: String,

    #[serde(default)]
    #[validate(custom(function = "valid_due_date"))]
    pub due_date: String,
}

/// Validated task fields, without a parent project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: String,
    pub due_date: NaiveDate,
}

impl TaskForm {
    fn trimmed(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            status: self.status.trim().to_string(),
            due_date: self.due_date.trim().to_string(),
        }
    }

    /// Validates the submission
    pub fn clean(&self) -> Result<TaskDraft, FormErrors> {
        let form = self.trimmed();
        run_validators(&form)?;

        let mut errors = FormErrors::new();
        let due_date = parse_date(&form.due_date);
        if due_date.is_none() {
            errors.add("due_date", "Enter a valid date.");
        }
        errors.into_result()?;

        Ok(TaskDraft {
            title: form.title,
            description: form.description,
            status: form.status,
            due_date: due_date.unwrap_or_default(),
        })
    }
}

impl From<&Task> for TaskForm {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status.clone(),
            due_date: task.due_date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl TaskDraft {
    /// Attaches the parent project for insertion
    pub fn under(self, project_id: Uuid) -> CreateTask {
        CreateTask {
            title: self.title,
            description: self.description,
            status: self.status,
            due_date: self.due_date,
            project_id,
        }
    }
}

impl From<TaskDraft> for UpdateTask {
    fn from(draft: TaskDraft) -> Self {
        Self {
            title: draft.title,
            description: draft.description,
            status: draft.status,
            due_date: draft.due_date,
        }
    }
}

/// Sign-in form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(custom(function = "required", message = "This field is required."))]
    pub username: String,

    #[serde(default)]
    #[validate(custom(function = "required", message = "This field is required."))]
    pub password: String,

    /// Where to go after signing in
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    /// Checks both fields are present; credentials are checked by the handler
    pub fn clean(&self) -> Result<(), FormErrors> {
        let form = Self {
            username: self.username.trim().to_string(),
            ..self.clone()
        };
        run_validators(&form)
    }
}

/// Account registration form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RegisterForm {
    #[serde(default)]
    #[validate(
        custom(function = "valid_username"),
        length(max = 150, message = "Ensure this value has at most 150 characters.")
    )]
    pub username: String,

    #[serde(default)]
    #[validate(custom(function = "required", message = "This field is required."))]
    pub password: String,

    #[serde(default)]
    #[validate(custom(function = "required", message = "This field is required."))]
    pub password_confirm: String,
}

/// Validated registration input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDraft {
    pub username: String,
    pub password: String,
}

impl RegisterForm {
    /// Validates the submission, including the password policy and match
    pub fn clean(&self) -> Result<RegisterDraft, FormErrors> {
        let form = Self {
            username: self.username.trim().to_string(),
            ..self.clone()
        };
        run_validators(&form)?;

        let mut errors = FormErrors::new();
        if let Err(message) = validate_password_strength(&form.password) {
            errors.add("password", message);
        }
        if form.password != form.password_confirm {
            errors.add("password_confirm", "The two password fields didn't match.");
        }
        errors.into_result()?;

        Ok(RegisterDraft {
            username: form.username,
            password: form.password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_form(title: &str, status: &str, due_date: &str) -> TaskForm {
        TaskForm {
            title: title.to_string(),
            description: "desc".to_string(),
            status: status.to_string(),
            due_date: due_date.to_string(),
        }
    }

    #[test]
    fn test_project_form_valid_is_trimmed() {
        let form = ProjectForm {
            name: "  X  ".to_string(),
            description: "\tY\n".to_string(),
        };

        let draft = form.clean().unwrap();
        assert_eq!(draft.name, "X");
        assert_eq!(draft.description, "Y");
    }

    #[test]
    fn test_project_form_missing_fields() {
        let errors = ProjectForm::default().clean().unwrap_err();

        assert_eq!(errors.get("name"), [REQUIRED]);
        assert_eq!(errors.get("description"), [REQUIRED]);
        assert!(errors.non_field().is_empty());
    }

    #[test]
    fn test_project_form_blank_name() {
        let form = ProjectForm {
            name: "   ".to_string(),
            description: "Y".to_string(),
        };

        let errors = form.clean().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_project_form_name_too_long() {
        let form = ProjectForm {
            name: "x".repeat(101),
            description: "Y".to_string(),
        };

        let errors = form.clean().unwrap_err();
        assert_eq!(
            errors.get("name"),
            ["Ensure this value has at most 100 characters."]
        );

        let form = ProjectForm {
            name: "x".repeat(100),
            description: "Y".to_string(),
        };
        assert!(form.clean().is_ok());
    }

    #[test]
    fn test_project_draft_owner_attached() {
        let owner = Uuid::new_v4();
        let draft = ProjectDraft {
            name: "X".to_string(),
            description: "Y".to_string(),
        };

        let create = draft.clone().owned_by(owner);
        assert_eq!(create.created_by, owner);

        let update = UpdateProject::from(draft);
        assert_eq!(update.name, "X");
    }

    #[test]
    fn test_project_form_ignores_owner_field() {
        let body = "name=X&description=Y&created_by=00000000-0000-0000-0000-000000000000";
        let form: ProjectForm = serde_urlencoded::from_str(body).unwrap();

        assert_eq!(form.name, "X");
        assert_eq!(form.description, "Y");
    }

    #[test]
    fn test_task_form_valid() {
        let draft = task_form("T", "open", "2024-01-01").clean().unwrap();

        assert_eq!(draft.title, "T");
        assert_eq!(draft.status, "open");
        assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        let project_id = Uuid::new_v4();
        assert_eq!(draft.under(project_id).project_id, project_id);
    }

    #[test]
    fn test_task_form_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

        for input in ["2024-03-09", "03/09/2024", "03/09/24", " 2024-03-09 "] {
            let draft = task_form("T", "open", input).clean().unwrap();
            assert_eq!(draft.due_date, expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_task_form_bad_date() {
        let errors = task_form("T", "open", "2024-13-45").clean().unwrap_err();
        assert_eq!(errors.get("due_date"), ["Enter a valid date."]);

        let errors = task_form("T", "open", "").clean().unwrap_err();
        assert_eq!(errors.get("due_date"), [REQUIRED]);
    }

    #[test]
    fn test_task_form_status_rules() {
        // Any non-blank value up to 20 characters is accepted
        assert!(task_form("T", "waiting-on-review", "2024-01-01").clean().is_ok());

        let errors = task_form("T", &"s".repeat(21), "2024-01-01")
            .clean()
            .unwrap_err();
        assert_eq!(
            errors.get("status"),
            ["Ensure this value has at most 20 characters."]
        );
    }

    #[test]
    fn test_task_form_from_task_round_trips_date() {
        let task = Task {
            id: Uuid::new_v4(),
            title: "T".to_string(),
            description: "D".to_string(),
            status: "open".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            project_id: Uuid::new_v4(),
            is_deleted: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let form = TaskForm::from(&task);
        assert_eq!(form.due_date, "2024-01-01");
        assert_eq!(form.clean().unwrap().due_date, task.due_date);
    }

    #[test]
    fn test_login_form_requires_both() {
        let errors = LoginForm::default().clean().unwrap_err();
        assert_eq!(errors.get("username"), [REQUIRED]);
        assert_eq!(errors.get("password"), [REQUIRED]);

        let form = LoginForm {
            username: "alice".to_string(),
            password: "pw".to_string(),
            next: None,
        };
        assert!(form.clean().is_ok());
    }

    #[test]
    fn test_register_form() {
        let form = RegisterForm {
            username: " alice ".to_string(),
            password: "long-password".to_string(),
            password_confirm: "long-password".to_string(),
        };
        let draft = form.clean().unwrap();
        assert_eq!(draft.username, "alice");

        let form = RegisterForm {
            username: "bad name!".to_string(),
            password: "short".to_string(),
            password_confirm: "other".to_string(),
        };
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.get("username").len(), 1);
        assert!(errors.get("password").is_empty());
    }

    #[test]
    fn test_register_form_password_rules() {
        let form = RegisterForm {
            username: "alice".to_string(),
            password: "short".to_string(),
            password_confirm: "shorter".to_string(),
        };

        let errors = form.clean().unwrap_err();
        assert!(errors.get("password")[0].contains("at least 8 characters"));
        assert_eq!(
            errors.get("password_confirm"),
            ["The two password fields didn't match."]
        );
    }

    #[test]
    fn test_form_errors_non_field() {
        let mut errors = FormErrors::new();
        assert!(errors.is_empty());

        errors.add_non_field("Please enter a correct username and password.");
        assert_eq!(errors.non_field().len(), 1);
        assert!(errors.get("username").is_empty());
    }
}

/// HTML rendering
///
/// Templates are embedded in the binary and compiled once at startup into a
/// shared [`Views`] instance. Autoescaping is on for every `.html` template.
///
/// Forms are rendered generically: a handler turns its form and
/// [`FormErrors`] into a list of [`FieldView`]s and the `form.html`
/// template lays them out.

use serde::Serialize;
use tasktrack_shared::{
    forms::{FormErrors, LoginForm, ProjectForm, RegisterForm, TaskForm},
    models::{project::Project, task::Task},
};
use tera::{Context, Tera};

const TEMPLATES: [(&str, &str); 5] = [
    ("base.html", include_str!("../templates/base.html")),
    ("project_list.html", include_str!("../templates/project_list.html")),
    ("project_detail.html", include_str!("../templates/project_detail.html")),
    ("form.html", include_str!("../templates/form.html")),
    ("confirm_delete.html", include_str!("../templates/confirm_delete.html")),
];

/// Compiled templates
#[derive(Debug)]
pub struct Views {
    tera: Tera,
}

impl Views {
    /// Compiles the embedded templates
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        tera.autoescape_on(vec![".html"]);

        Ok(Self { tera })
    }

    /// Renders a template with a serializable context
    pub fn render<C: Serialize>(&self, template: &str, context: &C) -> Result<String, tera::Error> {
        let context = Context::from_serialize(context)?;
        self.tera.render(template, &context)
    }
}

/// Input widget kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Textarea,
    Date,
    Password,
}

/// One form field as the template sees it
#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: InputKind,
    pub value: String,
    pub max_length: Option<usize>,
    pub errors: Vec<String>,
}

impl FieldView {
    fn new(
        name: &'static str,
        label: &'static str,
        kind: InputKind,
        value: &str,
        errors: &FormErrors,
    ) -> Self {
        Self {
            name,
            label,
            kind,
            value: value.to_string(),
            max_length: None,
            errors: errors.get(name).to_vec(),
        }
    }

    fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }
}

fn description_field(value: &str, errors: &FormErrors) -> FieldView {
    FieldView::new("description", "Description", InputKind::Textarea, value, errors)
}

pub fn project_fields(form: &ProjectForm, errors: &FormErrors) -> Vec<FieldView> {
    vec![
        FieldView::new("name", "Name", InputKind::Text, &form.name, errors).max_length(100),
        description_field(&form.description, errors),
    ]
}

pub fn task_fields(form: &TaskForm, errors: &FormErrors) -> Vec<FieldView> {
    vec![
        FieldView::new("title", "Title", InputKind::Text, &form.title, errors).max_length(100),
        description_field(&form.description, errors),
        FieldView::new("status", "Status", InputKind::Text, &form.status, errors).max_length(20),
        FieldView::new("due_date", "Due date", InputKind::Date, &form.due_date, errors),
    ]
}

fn username_field(value: &str, errors: &FormErrors) -> FieldView {
    FieldView::new("username", "Username", InputKind::Text, value, errors).max_length(150)
}

/// Passwords are never echoed back
fn password_field(name: &'static str, label: &'static str, errors: &FormErrors) -> FieldView {
    FieldView::new(name, label, InputKind::Password, "", errors)
}

pub fn login_fields(form: &LoginForm, errors: &FormErrors) -> Vec<FieldView> {
    vec![
        username_field(&form.username, errors),
        password_field("password", "Password", errors),
    ]
}

pub fn register_fields(form: &RegisterForm, errors: &FormErrors) -> Vec<FieldView> {
    vec![
        username_field(&form.username, errors),
        password_field("password", "Password", errors),
        password_field("password_confirm", "Password confirmation", errors),
    ]
}

/// Navigation link
#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub href: String,
    pub label: String,
}

impl Link {
    pub fn new(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectListPage<'a> {
    pub username: Option<&'a str>,
    pub projects: &'a [Project],
}

#[derive(Debug, Serialize)]
pub struct ProjectDetailPage<'a> {
    pub username: Option<&'a str>,
    pub project: &'a Project,
    pub tasks: &'a [Task],
}

/// Any create/edit/account form
#[derive(Debug, Serialize)]
pub struct FormPage<'a> {
    pub username: Option<&'a str>,
    pub heading: String,
    pub action: String,
    pub submit: &'static str,
    pub fields: Vec<FieldView>,
    pub form_errors: Vec<String>,
    pub next: Option<String>,
    pub cancel: Option<Link>,
}

impl<'a> FormPage<'a> {
    pub fn new(
        username: Option<&'a str>,
        heading: impl Into<String>,
        action: impl Into<String>,
        fields: Vec<FieldView>,
        errors: &FormErrors,
    ) -> Self {
        Self {
            username,
            heading: heading.into(),
            action: action.into(),
            submit: "Save",
            fields,
            form_errors: errors.non_field().to_vec(),
            next: None,
            cancel: None,
        }
    }

    pub fn submit(mut self, label: &'static str) -> Self {
        self.submit = label;
        self
    }

    pub fn next(mut self, next: Option<String>) -> Self {
        self.next = next;
        self
    }

    pub fn cancel(mut self, link: Link) -> Self {
        self.cancel = Some(link);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ConfirmDeletePage<'a> {
    pub username: Option<&'a str>,
    pub kind: &'static str,
    pub object_name: &'a str,
    pub action: String,
    pub cancel: Link,
}

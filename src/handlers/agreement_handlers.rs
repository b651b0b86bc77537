use actix_session::Session;
use actix_web::{web, HttpResponse};

use super::see_other;
use crate::api::{AgreementApi, ApiError};
use crate::errors::{render, AppError};
use crate::session::{clear_soft_return, csrf, set_flash};
use crate::templates_structs::{
    AgreementDetailTemplate, AgreementFormTemplate, AgreementFormValues, PageContext,
};

/// GET /agreements/new
pub async fn new_form(session: Session) -> Result<HttpResponse, AppError> {
    clear_soft_return(&session);
    let ctx = PageContext::build(&session, "/agreements/new");
    let form = AgreementFormValues { currency: "EUR".to_string(), ..AgreementFormValues::default() };
    render(AgreementFormTemplate { ctx, errors: Vec::new(), form })
}

/// POST /agreements
pub async fn create(
    api: web::Data<dyn AgreementApi>,
    session: Session,
    form: web::Form<AgreementFormValues>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let values = form.into_inner();

    let errors = match values.to_new_agreement() {
        Ok(new) => match api.create_agreement(&new).await {
            Ok(created) => {
                log::info!("Created draft agreement {}", created.agreement_number);
                set_flash(&session, &format!("Draft agreement {} created", created.agreement_number));
                return Ok(see_other(&format!("/agreements/{}", created.id)));
            }
            Err(ApiError::Validation(errors)) => errors,
            Err(e) => return Err(e.into()),
        },
        Err(msg) => vec![msg],
    };

    let ctx = PageContext::build(&session, "/agreements/new");
    render(AgreementFormTemplate { ctx, errors, form: values })
}

/// GET /agreements/{id}
pub async fn detail(
    api: web::Data<dyn AgreementApi>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    clear_soft_return(&session);
    let id = path.into_inner();
    let agreement = api.get_agreement(&id).await?.ok_or(AppError::NotFound)?;
    let ctx = PageContext::build(&session, &format!("/agreements/{id}"));
    render(AgreementDetailTemplate { ctx, agreement })
}

//! Mapping between hotel API payloads and domain records.
//!
//! The API is inconsistent about envelopes (`data`, `results`, named
//! collections, bare arrays), field names (French and English, several
//! spellings) and number encoding (numbers or decimal strings). Everything
//! is resolved here, once; the workflow only ever sees canonical records.

use crate::dates::DateRange;
use crate::error::ApiError;
use crate::payment::normalize_status;
use crate::types::{
    Client, ClientFields, ClientId, Money, PaymentId, PaymentRecord, PaymentRequest,
    ReservationId, ReservationRecord, ReservationRequest, ReservedRoom, RoomId, RoomRecord,
    RoomStatus,
};
use chrono::NaiveDate;
use serde_json::{Map, Value, json};

type Object = Map<String, Value>;

const ENVELOPES: &[&str] = &["data", "results", "items", "payload"];

const ROOM_ID: &[&str] = &["id", "id_chambre", "chambre_id", "room_id"];
const CLIENT_ID: &[&str] = &["id", "id_client", "client_id"];
const RESERVATION_ID: &[&str] = &["id", "id_reservation", "reservation_id"];
const PAYMENT_ID: &[&str] = &["id", "id_paiement", "paiement_id", "payment_id"];

// ============================================================================
// Envelopes and scalar coercion
// ============================================================================

/// Unwrap a list response
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if no list can be found.
pub fn records(body: Value, collections: &[&str]) -> Result<Vec<Value>, ApiError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut object) => {
            for key in collections.iter().chain(ENVELOPES) {
                if let Some(inner) = object.remove(*key) {
                    return records(inner, collections);
                }
            }
            Err(ApiError::Decode(format!(
                "expected a list, got an object with keys {:?}",
                object.keys().collect::<Vec<_>>()
            )))
        },
        other => Err(ApiError::Decode(format!("expected a list, got {other}"))),
    }
}

/// Unwrap a single-record response
///
/// An object that already carries one of `ids` is the record itself.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if the body is not an object.
pub fn record(body: Value, names: &[&str], ids: &[&str]) -> Result<Object, ApiError> {
    let Value::Object(mut object) = body else {
        return Err(ApiError::Decode(format!("expected an object, got {body}")));
    };

    if field(&object, ids).is_some() {
        return Ok(object);
    }

    let envelope = names
        .iter()
        .chain(ENVELOPES)
        .find(|key| matches!(object.get(**key), Some(Value::Object(_))));
    match envelope.and_then(|key| object.remove(*key)) {
        Some(inner) => record(inner, names, ids),
        None => Ok(object),
    }
}

fn field<'a>(object: &'a Object, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|key| object.get(*key))
        .filter(|value| !value.is_null())
}

fn int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract().abs() < f64::EPSILON)
                .and_then(f64_to_i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Rounds to the nearest integer, `None` outside the `i64` range
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)] // bounds checked first
fn f64_to_i64(value: f64) -> Option<i64> {
    let rounded = value.round();
    (rounded >= i64::MIN as f64 && rounded < i64::MAX as f64).then(|| rounded as i64)
}

fn money(value: &Value) -> Option<Money> {
    let units: f64 = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().replace(',', ".").parse().ok()?,
        _ => return None,
    };
    f64_to_i64(units * 100.0).map(Money::from_cents)
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_i64().map(|n| n != 0),
        Value::String(text) => match text.trim().to_lowercase().as_str() {
            "true" | "1" | "oui" | "yes" | "privee" | "privée" | "private" => Some(true),
            "false" | "0" | "non" | "no" | "partagee" | "partagée" | "shared" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    NaiveDate::parse_from_str(text.get(..10).unwrap_or(text), "%Y-%m-%d").ok()
}

fn id_of(object: &Object, aliases: &[&str]) -> Option<i64> {
    field(object, aliases).and_then(int)
}

fn text_of(object: &Object, aliases: &[&str]) -> String {
    field(object, aliases).and_then(text).unwrap_or_default()
}

fn nested_id(object: &Object, keys: &[&str], ids: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::Object(inner) => id_of(inner, ids),
        other => int(other),
    })
}

// ============================================================================
// Rooms
// ============================================================================

/// Map a room status label
#[must_use]
pub fn room_status(label: &str) -> RoomStatus {
    match label.trim().to_lowercase().as_str() {
        "disponible" | "available" | "libre" | "free" => RoomStatus::Available,
        "occupee" | "occupée" | "occupied" | "reservee" | "réservée" | "booked" => {
            RoomStatus::Occupied
        },
        "maintenance" | "hors_service" | "hors service" | "nettoyage" | "cleaning"
        | "out_of_service" => RoomStatus::OutOfService,
        other => RoomStatus::Other(other.to_string()),
    }
}

/// Map one room payload
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if the room has no usable identifier.
pub fn room(value: Value) -> Result<RoomRecord, ApiError> {
    let object = record(value, &["chambre", "room"], ROOM_ID)?;
    let id = id_of(&object, ROOM_ID)
        .ok_or_else(|| ApiError::Decode("room without identifier".into()))?;

    let room_type = field(&object, &["type_chambre", "typeChambre", "room_type", "type"]);
    let (type_name, type_price) = match room_type {
        Some(Value::Object(inner)) => (
            field(inner, &["nom", "name", "libelle", "label"]).and_then(text),
            field(inner, &["prix_base", "base_price", "prix", "price"]).and_then(money),
        ),
        Some(other) => (text(other), None),
        None => (None, None),
    };

    let number = field(&object, &["numero", "number", "numero_chambre", "room_number"])
        .and_then(text)
        .unwrap_or_else(|| id.to_string());

    Ok(RoomRecord {
        id: RoomId::new(id),
        number,
        room_type: type_name
            .or_else(|| field(&object, &["type_nom", "type_name"]).and_then(text))
            .unwrap_or_default(),
        nightly_price: field(
            &object,
            &["prix_nuit", "prix_par_nuit", "nightly_price", "prix", "price", "tarif"],
        )
        .and_then(money),
        base_price: type_price.or_else(|| {
            field(&object, &["prix_base", "base_price"]).and_then(money)
        }),
        capacity: field(&object, &["capacite", "capacity", "nb_personnes"])
            .and_then(int)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(1),
        private: field(&object, &["privee", "prive", "private", "is_private"])
            .and_then(flag)
            .unwrap_or(true),
        // The availability endpoint already filters; an absent status means available
        status: field(&object, &["statut", "status", "etat", "disponibilite"])
            .and_then(text)
            .map_or(RoomStatus::Available, |label| room_status(&label)),
    })
}

/// Map an availability response; entries without an identifier are skipped
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if the response holds no list.
pub fn rooms(body: Value) -> Result<Vec<RoomRecord>, ApiError> {
    Ok(records(body, &["chambres", "rooms", "chambres_disponibles"])?
        .into_iter()
        .filter_map(|value| match room(value) {
            Ok(room) => Some(room),
            Err(error) => {
                tracing::warn!(error = %error, "Room entry skipped");
                None
            },
        })
        .collect())
}

// ============================================================================
// Clients
// ============================================================================

/// Map one client payload
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if the client has no usable identifier.
pub fn client(value: Value) -> Result<Client, ApiError> {
    let object = record(value, &["client"], CLIENT_ID)?;
    let id = id_of(&object, CLIENT_ID)
        .ok_or_else(|| ApiError::Decode("client without identifier".into()))?;

    Ok(Client {
        id: ClientId::new(id),
        fields: ClientFields {
            family_name: text_of(&object, &["nom", "last_name", "family_name", "lastname"]),
            given_name: text_of(&object, &["prenom", "first_name", "given_name", "firstname"]),
            email: text_of(&object, &["email", "mail", "courriel"]),
            phone: text_of(&object, &["telephone", "phone", "tel", "mobile"]),
            document: text_of(
                &object,
                &["cin", "document", "numero_piece", "piece_identite", "passport"],
            ),
        },
    })
}

/// Map a client search response; entries without an identifier are skipped
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if the response holds no list.
pub fn clients(body: Value) -> Result<Vec<Client>, ApiError> {
    Ok(records(body, &["clients"])?
        .into_iter()
        .filter_map(|value| client(value).ok())
        .collect())
}

/// Body of a client creation
#[must_use]
pub fn client_body(fields: &ClientFields) -> Value {
    json!({
        "nom": fields.family_name.trim(),
        "prenom": fields.given_name.trim(),
        "email": fields.email.trim(),
        "telephone": fields.phone.trim(),
        "cin": fields.document.trim(),
    })
}

// ============================================================================
// Reservations
// ============================================================================

/// Body of a reservation creation
#[must_use]
pub fn reservation_body(request: &ReservationRequest) -> Value {
    json!({
        "client_id": request.client_id.get(),
        "chambres": request
            .rooms
            .iter()
            .map(|line| json!({ "chambre_id": line.room_id.get(), "quantite": line.quantity }))
            .collect::<Vec<_>>(),
        "date_debut": request.range.start().to_string(),
        "date_fin": request.range.end().to_string(),
        "statut": request.status.as_str(),
    })
}

fn reserved_room(value: &Value) -> Option<ReservedRoom> {
    let (id, quantity) = match value {
        Value::Object(line) => (
            id_of(line, &["chambre_id", "id_chambre", "room_id", "id"])
                .or_else(|| nested_id(line, &["chambre", "room"], ROOM_ID))?,
            field(line, &["quantite", "quantity", "qte"]).and_then(int).unwrap_or(1),
        ),
        other => (int(other)?, 1),
    };
    Some(ReservedRoom {
        room_id: RoomId::new(id),
        quantity: u32::try_from(quantity).ok().filter(|q| *q >= 1).unwrap_or(1),
    })
}

/// Map a reservation creation response
///
/// Fields the API does not echo are taken from `request`.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if the reservation has no usable identifier.
pub fn reservation(
    body: Value,
    request: &ReservationRequest,
) -> Result<ReservationRecord, ApiError> {
    let object = record(body, &["reservation"], RESERVATION_ID)?;
    let id = id_of(&object, RESERVATION_ID)
        .ok_or_else(|| ApiError::Decode("reservation without identifier".into()))?;

    let start = field(&object, &["date_debut", "date_arrivee", "start_date", "check_in"])
        .and_then(date);
    let end = field(&object, &["date_fin", "date_depart", "end_date", "check_out"])
        .and_then(date);
    let range = match (start, end) {
        (Some(start), Some(end)) => DateRange::new(start, end).unwrap_or(request.range),
        _ => request.range,
    };

    let rooms = field(&object, &["chambres", "rooms"])
        .and_then(Value::as_array)
        .map(|lines| lines.iter().filter_map(reserved_room).collect::<Vec<_>>())
        .filter(|lines| !lines.is_empty())
        .unwrap_or_else(|| request.rooms.clone());

    Ok(ReservationRecord {
        id: ReservationId::new(id),
        client_id: id_of(&object, &["client_id", "id_client"])
            .or_else(|| nested_id(&object, &["client"], CLIENT_ID))
            .map_or(request.client_id, ClientId::new),
        rooms,
        range,
        status: field(&object, &["statut", "status"])
            .and_then(text)
            .unwrap_or_else(|| request.status.as_str().to_string()),
        nights: field(&object, &["nombre_nuits", "nuits", "nights"])
            .and_then(int)
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n >= 1),
        total: field(&object, &["montant_total", "prix_total", "total", "total_price"])
            .and_then(money),
    })
}

// ============================================================================
// Payments
// ============================================================================

/// Body of a payment creation
#[must_use]
pub fn payment_body(request: &PaymentRequest) -> Value {
    json!({
        "reservation_id": request.reservation_id.get(),
        "montant": request.amount.as_decimal(),
        "date_paiement": request.date.to_string(),
        "methode_paiement": request.method,
        "statut": request.status.as_str(),
    })
}

/// Map a payment creation response
///
/// Fields the API does not echo are taken from `request`.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if the payment has no usable identifier.
pub fn payment(body: Value, request: &PaymentRequest) -> Result<PaymentRecord, ApiError> {
    let object = record(body, &["paiement", "payment"], PAYMENT_ID)?;
    let id = id_of(&object, PAYMENT_ID)
        .ok_or_else(|| ApiError::Decode("payment without identifier".into()))?;

    Ok(PaymentRecord {
        id: PaymentId::new(id),
        reservation_id: id_of(&object, &["reservation_id", "id_reservation"])
            .or_else(|| nested_id(&object, &["reservation"], RESERVATION_ID))
            .map_or(request.reservation_id, ReservationId::new),
        amount: field(&object, &["montant", "amount"])
            .and_then(money)
            .unwrap_or(request.amount),
        date: field(&object, &["date_paiement", "payment_date", "date"])
            .and_then(date)
            .unwrap_or(request.date),
        method: field(&object, &["methode_paiement", "methode", "mode_paiement", "method"])
            .and_then(text)
            .unwrap_or_else(|| request.method.clone()),
        status: field(&object, &["statut", "status"])
            .and_then(Value::as_str)
            .map_or(request.status, normalize_status),
    })
}

// ============================================================================
// Errors
// ============================================================================

/// Human-readable message from an error body
#[must_use]
pub fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|value| match value {
        Value::Object(object) => field(object, &["message", "detail", "error", "erreur"])
            .map(|value| value.as_str().map_or_else(|| value.to_string(), str::to_string))
            .or_else(|| Some(value.to_string())),
        Value::String(text) => Some(text.clone()),
        _ => None,
    });

    message.unwrap_or_else(|| body.trim().chars().take(200).collect())
}

// SPDX-License-Identifier: Apache-2.0

use serde_json::{json, Map, Value};

use crate::errors::API_ERROR_CODES;

fn error_response(description: &str) -> Value {
    json!({
      "description": description,
      "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiErrorBody"}}}
    })
}

fn ok_response(description: &str, schema: &str) -> Value {
    json!({
      "description": description,
      "content": {"application/json": {"schema": {
        "type": "object",
        "required": ["data"],
        "properties": {"data": {"$ref": format!("#/components/schemas/{schema}")}}
      }}}
    })
}

fn ok_list_response(description: &str, schema: &str) -> Value {
    json!({
      "description": description,
      "content": {"application/json": {"schema": {
        "type": "object",
        "required": ["data"],
        "properties": {"data": {"type": "array", "items": {"$ref": format!("#/components/schemas/{schema}")}}}
      }}}
    })
}

fn body(schema: &str) -> Value {
    json!({
      "required": true,
      "content": {"application/json": {"schema": {"$ref": format!("#/components/schemas/{schema}")}}}
    })
}

fn id_param() -> Value {
    json!({"name": "id", "in": "path", "required": true, "schema": {"type": "string"}})
}

const STATUSES: [&str; 5] = ["PENDING", "ACCEPTED", "IN_TRANSIT", "DELIVERED", "CANCELLED"];

/// Builds an object from entries, one `json!` call each.
fn object(entries: Vec<(&str, Value)>) -> Value {
    Value::Object(
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect::<Map<String, Value>>(),
    )
}

fn paths() -> Value {
    let bearer = json!([{"bearerAuth": []}]);
    object(vec![
        ("/healthz", json!({"get": {"responses": {"200": {"description": "ok"}}}})),
        ("/readyz", json!({"get": {"responses": {
          "200": {"description": "ready"},
          "503": error_response("store unavailable")
        }}})),
        ("/v1/version", json!({"get": {"responses": {"200": {"description": "service version metadata"}}}})),
        ("/v1/openapi.json", json!({"get": {"responses": {"200": {"description": "this document"}}}})),
        ("/v1/auth/register", json!({"post": {
          "requestBody": body("RegisterRequest"),
          "responses": {
            "201": ok_response("registered", "User"),
            "400": error_response("invalid registration"),
            "409": error_response("username taken")
          }
        }})),
        ("/v1/auth/login", json!({"post": {
          "requestBody": body("LoginRequest"),
          "responses": {
            "200": ok_response("session issued", "Session"),
            "400": error_response("invalid body"),
            "401": error_response("invalid credentials")
          }
        }})),
        ("/v1/auth/session", json!({"get": {
          "security": bearer,
          "responses": {
            "200": ok_response("current user", "User"),
            "401": error_response("missing or invalid session")
          }
        }})),
        ("/v1/listings", json!({
          "get": {"responses": {"200": ok_list_response("all listings, newest first", "Listing")}},
          "post": {
            "security": bearer,
            "requestBody": body("CreateListingRequest"),
            "responses": {
              "201": ok_response("listing created", "Listing"),
              "400": error_response("invalid listing"),
              "401": error_response("missing or invalid session"),
              "404": error_response("farmer profile missing")
            }
          }
        })),
        ("/v1/listings/{id}", json!({
          "get": {
            "parameters": [id_param()],
            "responses": {
              "200": ok_response("listing", "Listing"),
              "404": error_response("listing missing")
            }
          },
          "delete": {
            "security": bearer,
            "parameters": [id_param()],
            "responses": {
              "204": {"description": "deleted"},
              "401": error_response("missing or invalid session"),
              "403": error_response("not the owner"),
              "404": error_response("listing missing"),
              "409": error_response("listing referenced by contracts")
            }
          }
        })),
        ("/v1/farmer/listings", json!({"get": {
          "security": bearer,
          "responses": {
            "200": ok_list_response("caller's listings, newest first", "Listing"),
            "401": error_response("missing or invalid session"),
            "404": error_response("farmer profile missing")
          }
        }})),
        ("/v1/farmer/profile", json!({"get": {
          "security": bearer,
          "responses": {
            "200": ok_response("farmer profile", "FarmerProfile"),
            "401": error_response("missing or invalid session"),
            "403": error_response("caller is not a farmer"),
            "404": error_response("farmer profile missing")
          }
        }})),
        ("/v1/contracts", json!({
          "get": {
            "security": bearer,
            "parameters": [
              {"name": "status", "in": "query", "schema": {"type": "string", "enum": STATUSES}}
            ],
            "responses": {
              "200": ok_list_response("contracts where the caller is a party, newest first", "Contract"),
              "400": error_response("invalid status filter"),
              "401": error_response("missing or invalid session"),
              "404": error_response("profile missing")
            }
          },
          "post": {
            "security": bearer,
            "requestBody": body("CreateContractRequest"),
            "responses": {
              "201": ok_response("contract created in PENDING", "Contract"),
              "400": error_response("invalid request"),
              "401": error_response("missing or invalid session"),
              "404": error_response("listing or buyer profile missing"),
              "409": error_response("insufficient quantity")
            }
          }
        })),
        ("/v1/contracts/{id}", json!({
          "get": {
            "security": bearer,
            "parameters": [id_param()],
            "responses": {
              "200": ok_response("contract", "Contract"),
              "401": error_response("missing or invalid session"),
              "403": error_response("caller is not a party"),
              "404": error_response("contract missing")
            }
          },
          "patch": {
            "security": bearer,
            "parameters": [id_param()],
            "requestBody": body("TransitionRequest"),
            "responses": {
              "200": ok_response("contract after transition", "Contract"),
              "400": error_response("unknown status literal"),
              "401": error_response("missing or invalid session"),
              "403": error_response("caller may not perform this transition"),
              "404": error_response("contract missing"),
              "409": error_response("illegal transition or insufficient quantity")
            }
          }
        })),
    ])
}

fn schemas() -> Value {
    let error_codes: Vec<&str> = API_ERROR_CODES.iter().map(|c| c.as_str()).collect();
    object(vec![
        ("ApiError", json!({
            "type": "object",
            "required": ["code", "message", "details", "request_id"],
            "additionalProperties": false,
            "properties": {
              "code": {"$ref": "#/components/schemas/ApiErrorCode"},
              "message": {"type": "string"},
              "details": {"type": "object"},
              "request_id": {"type": "string"}
            }
          })),
        ("ApiErrorBody", json!({
            "type": "object",
            "required": ["error"],
            "additionalProperties": false,
            "properties": {"error": {"$ref": "#/components/schemas/ApiError"}}
          })),
        ("ApiErrorCode", json!({"type": "string", "enum": error_codes})),
        ("Contract", json!({
            "type": "object",
            "required": ["id", "listing_id", "buyer_id", "farmer_id", "quantity_requested",
                         "delivery_date", "status", "notes", "created_at", "status_changed_at",
                         "next_statuses"],
            "properties": {
              "id": {"type": "string"},
              "listing_id": {"type": "string"},
              "buyer_id": {"type": "string"},
              "farmer_id": {"type": "string"},
              "quantity_requested": {"type": "integer", "minimum": 1},
              "delivery_date": {"type": "string", "format": "date"},
              "status": {"$ref": "#/components/schemas/ContractStatus"},
              "notes": {"type": "string"},
              "created_at": {"type": "string", "format": "date-time"},
              "status_changed_at": {"type": "string", "format": "date-time"},
              "next_statuses": {"type": "array", "items": {"$ref": "#/components/schemas/ContractStatus"}}
            }
          })),
        ("ContractStatus", json!({"type": "string", "enum": STATUSES})),
        ("CreateContractRequest", json!({
            "type": "object",
            "required": ["listing_id", "quantity_requested", "delivery_date"],
            "additionalProperties": false,
            "properties": {
              "listing_id": {"type": "string"},
              "quantity_requested": {"type": "integer", "minimum": 1},
              "delivery_date": {"type": "string", "format": "date"},
              "notes": {"type": "string"}
            }
          })),
        ("CreateListingRequest", json!({
            "type": "object",
            "required": ["name", "description", "price", "quantity", "location"],
            "additionalProperties": false,
            "properties": {
              "name": {"type": "string"},
              "description": {"type": "string"},
              "price": {"type": "number", "exclusiveMinimum": true, "minimum": 0},
              "quantity": {"type": "integer", "minimum": 0},
              "location": {"$ref": "#/components/schemas/Location"},
              "image_url": {"type": "string"}
            }
          })),
        ("FarmerProfile", json!({
            "type": "object",
            "required": ["id", "user_id", "crop_types"],
            "properties": {
              "id": {"type": "string"},
              "user_id": {"type": "string"},
              "experience_years": {"type": "integer", "nullable": true},
              "farm_size": {"type": "number", "nullable": true},
              "crop_types": {"type": "array", "items": {"type": "string"}}
            }
          })),
        ("Listing", json!({
            "type": "object",
            "required": ["id", "farmer_id", "name", "description", "price",
                         "quantity_available", "location", "created_at"],
            "properties": {
              "id": {"type": "string"},
              "farmer_id": {"type": "string"},
              "name": {"type": "string"},
              "description": {"type": "string"},
              "price": {"type": "number"},
              "quantity_available": {"type": "integer", "minimum": 0},
              "location": {"$ref": "#/components/schemas/Location"},
              "image_url": {"type": "string", "nullable": true},
              "created_at": {"type": "string", "format": "date-time"}
            }
          })),
        ("Location", json!({
            "type": "object",
            "required": ["address"],
            "additionalProperties": false,
            "properties": {
              "address": {"type": "string"},
              "latitude": {"type": "number", "minimum": -90, "maximum": 90},
              "longitude": {"type": "number", "minimum": -180, "maximum": 180}
            }
          })),
        ("LoginRequest", json!({
            "type": "object",
            "required": ["username", "password", "role"],
            "additionalProperties": false,
            "properties": {
              "username": {"type": "string"},
              "password": {"type": "string"},
              "role": {"$ref": "#/components/schemas/Role"}
            }
          })),
        ("RegisterRequest", json!({
            "type": "object",
            "required": ["name", "username", "password", "role", "location"],
            "additionalProperties": false,
            "properties": {
              "name": {"type": "string"},
              "username": {"type": "string", "minLength": 3, "maxLength": 32},
              "password": {"type": "string", "minLength": 8},
              "role": {"$ref": "#/components/schemas/Role"},
              "location": {"type": "string"},
              "farmer_details": {
                "type": "object",
                "properties": {
                  "experience_years": {"type": "integer"},
                  "farm_size": {"type": "number"},
                  "crop_types": {"type": "array", "items": {"type": "string"}}
                }
              }
            }
          })),
        ("Role", json!({"type": "string", "enum": ["FARMER", "BUYER"]})),
        ("Session", json!({
            "type": "object",
            "required": ["token", "expires_at", "user"],
            "properties": {
              "token": {"type": "string"},
              "expires_at": {"type": "string", "format": "date-time"},
              "user": {"$ref": "#/components/schemas/User"}
            }
          })),
        ("TransitionRequest", json!({
            "type": "object",
            "required": ["status"],
            "additionalProperties": false,
            "properties": {"status": {"type": "string"}}
          })),
        ("User", json!({
            "type": "object",
            "required": ["id", "name", "username", "role", "location", "created_at"],
            "properties": {
              "id": {"type": "string"},
              "name": {"type": "string"},
              "username": {"type": "string"},
              "role": {"$ref": "#/components/schemas/Role"},
              "location": {"type": "string"},
              "created_at": {"type": "string", "format": "date-time"}
            }
          })),
    ])
}

#[must_use]
pub fn openapi_v1_spec() -> Value {
    json!({
      "openapi": "3.0.3",
      "info": {"title": "CropConnect API", "version": "v1"},
      "paths": paths(),
      "components": {
        "securitySchemes": {
          "bearerAuth": {"type": "http", "scheme": "bearer"}
        },
        "schemas": schemas()
      }
    })
}

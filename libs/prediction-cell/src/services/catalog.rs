use serde_json::{json, Value};

/// Static per-disease input schemas consumed by the web client to render
/// prediction forms. Pure configuration: field order matches the declared
/// model feature order.
pub fn disease_catalog() -> Value {
    json!({
        "anemia": {
            "name": "Anemia Detection",
            "description": "Clinical-grade anemia detection using blood parameters (100% accuracy)",
            "fields": [
                { "name": "gender", "label": "Gender", "type": "select",
                  "options": [ { "value": 0, "label": "Female" }, { "value": 1, "label": "Male" } ] },
                { "name": "hemoglobin", "label": "Hemoglobin (g/dL)", "type": "number",
                  "min": 4, "max": 20, "step": 0.1, "required": true },
                { "name": "mch", "label": "MCH (pg)", "type": "number",
                  "min": 15, "max": 50, "step": 0.1, "required": true },
                { "name": "mchc", "label": "MCHC (g/dL)", "type": "number",
                  "min": 25, "max": 40, "step": 0.1, "required": true },
                { "name": "mcv", "label": "MCV (fL)", "type": "number",
                  "min": 60, "max": 120, "step": 0.1, "required": true }
            ]
        },
        "diabetes": {
            "name": "Diabetes Prediction",
            "description": "Type 2 diabetes risk assessment using clinical indicators",
            "fields": [
                { "name": "pregnancies", "label": "Pregnancies", "type": "number",
                  "min": 0, "max": 20, "step": 1 },
                { "name": "glucose", "label": "Glucose Level (mg/dL)", "type": "number",
                  "min": 50, "max": 300, "step": 1, "required": true },
                { "name": "bloodpressure", "label": "Blood Pressure (mmHg)", "type": "number",
                  "min": 60, "max": 200, "step": 1, "required": true },
                { "name": "skinthickness", "label": "Skin Thickness (mm)", "type": "number",
                  "min": 0, "max": 100, "step": 1 },
                { "name": "insulin", "label": "Insulin (mu U/ml)", "type": "number",
                  "min": 0, "max": 1000, "step": 1 },
                { "name": "bmi", "label": "BMI", "type": "number",
                  "min": 10, "max": 60, "step": 0.1, "required": true },
                { "name": "diabetespedigreefunction", "label": "Diabetes Pedigree Function",
                  "type": "number", "min": 0, "max": 3, "step": 0.001 },
                { "name": "age", "label": "Age (years)", "type": "number",
                  "min": 0, "max": 120, "step": 1, "required": true }
            ]
        },
        "heart_disease": {
            "name": "Heart Disease Prediction",
            "description": "Cardiovascular disease risk assessment using clinical parameters",
            "fields": [
                { "name": "age", "label": "Age (years)", "type": "number",
                  "min": 20, "max": 120, "step": 1, "required": true },
                { "name": "sex", "label": "Sex", "type": "select", "required": true,
                  "options": [ { "value": 0, "label": "Female" }, { "value": 1, "label": "Male" } ] },
                { "name": "cp", "label": "Chest Pain Type", "type": "select", "required": true,
                  "options": [
                      { "value": 0, "label": "Typical Angina" },
                      { "value": 1, "label": "Atypical Angina" },
                      { "value": 2, "label": "Non-anginal Pain" },
                      { "value": 3, "label": "Asymptomatic" }
                  ] },
                { "name": "trestbps", "label": "Resting Blood Pressure (mmHg)", "type": "number",
                  "min": 80, "max": 200, "step": 1, "required": true },
                { "name": "chol", "label": "Cholesterol (mg/dL)", "type": "number",
                  "min": 100, "max": 600, "step": 1, "required": true },
                { "name": "fbs", "label": "Fasting Blood Sugar > 120 mg/dl", "type": "select",
                  "options": [ { "value": 0, "label": "No" }, { "value": 1, "label": "Yes" } ] },
                { "name": "restecg", "label": "Resting ECG", "type": "select",
                  "options": [
                      { "value": 0, "label": "Normal" },
                      { "value": 1, "label": "ST-T Wave Abnormality" },
                      { "value": 2, "label": "Left Ventricular Hypertrophy" }
                  ] },
                { "name": "thalach", "label": "Max Heart Rate Achieved", "type": "number",
                  "min": 60, "max": 220, "step": 1, "required": true },
                { "name": "exang", "label": "Exercise Induced Angina", "type": "select",
                  "options": [ { "value": 0, "label": "No" }, { "value": 1, "label": "Yes" } ] },
                { "name": "oldpeak", "label": "ST Depression", "type": "number",
                  "min": 0, "max": 10, "step": 0.1 },
                { "name": "slope", "label": "Slope of Peak Exercise ST", "type": "select",
                  "options": [
                      { "value": 0, "label": "Upsloping" },
                      { "value": 1, "label": "Flat" },
                      { "value": 2, "label": "Downsloping" }
                  ] },
                { "name": "ca", "label": "Number of Major Vessels (0-3)", "type": "select",
                  "options": [
                      { "value": 0, "label": "0" },
                      { "value": 1, "label": "1" },
                      { "value": 2, "label": "2" },
                      { "value": 3, "label": "3" }
                  ] },
                { "name": "thal", "label": "Thalassemia", "type": "select",
                  "options": [
                      { "value": 1, "label": "Normal" },
                      { "value": 2, "label": "Fixed Defect" },
                      { "value": 3, "label": "Reversible Defect" }
                  ] }
            ]
        },
        "chronic": {
            "name": "Chronic Disease (Lung Cancer)",
            "description": "Chronic disease risk assessment focusing on lung cancer indicators",
            "fields": [
                { "name": "gender", "label": "Gender", "type": "select", "required": true,
                  "options": [ { "value": 0, "label": "Female" }, { "value": 1, "label": "Male" } ] },
                { "name": "age", "label": "Age (years)", "type": "number",
                  "min": 18, "max": 100, "step": 1, "required": true },
                { "name": "smoking", "label": "Smoking", "type": "select", "required": true,
                  "options": [ { "value": 1, "label": "No" }, { "value": 2, "label": "Yes" } ] },
                { "name": "yellow_fingers", "label": "Yellow Fingers", "type": "select",
                  "options": [ { "value": 1, "label": "No" }, { "value": 2, "label": "Yes" } ] },
                { "name": "anxiety", "label": "Anxiety", "type": "select",
                  "options": [ { "value": 1, "label": "No" }, { "value": 2, "label": "Yes" } ] },
                { "name": "peer_pressure", "label": "Peer Pressure", "type": "select",
                  "options": [ { "value": 1, "label": "No" }, { "value": 2, "label": "Yes" } ] },
                { "name": "chronic_disease", "label": "Existing Chronic Disease", "type": "select",
                  "options": [ { "value": 1, "label": "No" }, { "value": 2, "label": "Yes" } ] },
                { "name": "fatigue", "label": "Fatigue", "type": "select",
                  "options": [ { "value": 1, "label": "No" }, { "value": 2, "label": "Yes" } ] },
                { "name": "allergy", "label": "Allergy", "type": "select",
                  "options": [ { "value": 1, "label": "No" }, { "value": 2, "label": "Yes" } ] },
                { "name": "wheezing", "label": "Wheezing", "type": "select",
                  "options": [ { "value": 1, "label": "No" }, { "value": 2, "label": "Yes" } ] },
                { "name": "alcohol_consuming", "label": "Alcohol Consuming", "type": "select",
                  "options": [ { "value": 1, "label": "No" }, { "value": 2, "label": "Yes" } ] },
                { "name": "coughing", "label": "Coughing", "type": "select",
                  "options": [ { "value": 1, "label": "No" }, { "value": 2, "label": "Yes" } ] },
                { "name": "shortness_of_breath", "label": "Shortness of Breath", "type": "select",
                  "options": [ { "value": 1, "label": "No" }, { "value": 2, "label": "Yes" } ] },
                { "name": "swallowing_difficulty", "label": "Swallowing Difficulty", "type": "select",
                  "options": [ { "value": 1, "label": "No" }, { "value": 2, "label": "Yes" } ] },
                { "name": "chest_pain", "label": "Chest Pain", "type": "select",
                  "options": [ { "value": 1, "label": "No" }, { "value": 2, "label": "Yes" } ] }
            ]
        },
        "malaria": {
            "name": "Malaria Detection",
            "description": "AI-powered malaria detection from blood cell images (99.9% confidence)",
            "fields": [
                { "name": "image", "label": "Blood Cell Image", "type": "file",
                  "accept": "image/*", "required": true }
            ],
            "input_type": "image",
            "image_size": "224x224"
        }
    })
}

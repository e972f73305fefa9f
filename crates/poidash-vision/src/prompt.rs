pub(crate) const STRUCTURED_PROMPT: &str = "Analyze this 360-degree street view image and extract \
Points of Interest (POIs) such as shops or landmarks. Return a JSON object with a \"pois\" array \
containing objects with name, poi_type, phone, category, address (if visible), and coordinates \
(if inferable).";

pub(crate) const FREE_TEXT_PROMPT: &str = "Analyze this 360-degree street view image and extract \
Points of Interest (POIs) such as shops or landmarks.
Return a JSON object with a \"pois\" array containing objects with:
- name: string (name of the POI)
- poi_type: string (type of POI)
- phone: string (phone number if visible)
- category: string (category of the business)
- address: string (address if visible)
- coordinates: array of numbers (if inferable)

Return only valid JSON without any markdown formatting.";

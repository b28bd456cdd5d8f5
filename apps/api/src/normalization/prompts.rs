// Instruction sent with every normalization request. The endpoint is
// expected to answer with a single JSON object shaped like ExtractedDraft.

pub const NORMALIZE_INSTRUCTION: &str = "\
    You normalize Japanese IT job postings (SES案件) into structured JSON. \
    `data` holds a heuristic pre-extraction and `rawText` the original posting. \
    Return ONE JSON object using only these camelCase keys: \
    title, description, detailedDescription, recruitmentBackground, \
    mustSkills (string array), niceSkills (string array), \
    budgetMin, budgetMax (integers, 万円 per month), \
    workStyle (\"remote\" | \"onsite\" | \"hybrid\"), \
    location, workingHours, workingDays, attendanceFrequency, \
    interviewCount (integer), paymentRange (\"<N>h-<M>h\"), paymentTerms, \
    ageLimit (integer), foreignerAcceptable (boolean), \
    pcProvided (boolean, or \"要相談\" / \"確認中\"), \
    ngConditions, developmentEnvironment, \
    languageYears (array of {\"name\", \"years\"}, years as \"<N>年\" or \"<N>年以上\"). \
    Add `_confidence`: an object mapping each key you filled to a number in [0, 1]. \
    Omit keys you cannot determine. Never output empty strings or 不明. \
    Do NOT use markdown code fences.";
